// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the portal API plus client helpers.

use alumni_portal::config::Config;
use alumni_portal::navigation::Location;
use alumni_portal::store::{CredentialStore, MemoryStore};
use alumni_portal::ApiClient;
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const PHONE: &str = "+15550100";
pub const PASSWORD: &str = "correct horse";

/// How the mock answers `POST /auth/refresh`.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum RefreshBehavior {
    Issue {
        access_token: String,
        refresh_token: Option<String>,
    },
    Fail(StatusCode),
    Malformed,
    Hang,
}

struct MockState {
    /// The only access token protected routes accept.
    valid_token: Mutex<String>,
    refresh_behavior: Mutex<RefreshBehavior>,
    refresh_calls: AtomicUsize,
    refresh_bodies: Mutex<Vec<Value>>,
    /// (path, Authorization header) for every request to a recorded route
    seen: Mutex<Vec<(String, Option<String>)>>,
    hold_refresh: AtomicBool,
    refresh_gate: Semaphore,
    hold_reports: AtomicBool,
    reports_gate: Semaphore,
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap) -> Option<String> {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), auth.clone()));
        auth
    }

    fn authorized(&self, path: &str, headers: &HeaderMap) -> bool {
        let auth = self.record(path, headers);
        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        auth.as_deref() == Some(expected.as_str())
    }
}

/// Running mock API server.
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockApi {
    /// Start a server that accepts only `valid_token` on protected routes.
    ///
    /// Refreshes issue `valid_token` again unless told otherwise.
    pub async fn start(valid_token: &str) -> Self {
        let state = Arc::new(MockState {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh_behavior: Mutex::new(RefreshBehavior::Issue {
                access_token: valid_token.to_string(),
                refresh_token: None,
            }),
            refresh_calls: AtomicUsize::new(0),
            refresh_bodies: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
            hold_refresh: AtomicBool::new(false),
            refresh_gate: Semaphore::new(0),
            hold_reports: AtomicBool::new(false),
            reports_gate: Semaphore::new(0),
        });

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/news", get(news))
            .route("/events/{id}", get(event))
            .route("/memories", post(create_memory))
            .route("/reports", get(reports))
            .route("/always-401", get(always_unauthorized))
            .route("/missing", get(missing))
            .route("/public/courses", get(public_courses))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set_refresh(&self, behavior: RefreshBehavior) {
        *self.state.refresh_behavior.lock().unwrap() = behavior;
    }

    /// Make refresh calls block until [`release_refresh`](Self::release_refresh).
    pub fn hold_refresh(&self) {
        self.state.hold_refresh.store(true, Ordering::SeqCst);
    }

    pub fn release_refresh(&self) {
        self.state.hold_refresh.store(false, Ordering::SeqCst);
        self.state.refresh_gate.add_permits(64);
    }

    /// Make `/reports` answer only after [`release_reports`](Self::release_reports).
    ///
    /// The Authorization header is checked after the wait, against whatever
    /// token is valid by then.
    pub fn hold_reports(&self) {
        self.state.hold_reports.store(true, Ordering::SeqCst);
    }

    pub fn release_reports(&self) {
        self.state.hold_reports.store(false, Ordering::SeqCst);
        self.state.reports_gate.add_permits(64);
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_bodies(&self) -> Vec<Value> {
        self.state.refresh_bodies.lock().unwrap().clone()
    }

    /// Authorization headers received on `path`, in arrival order.
    pub fn authorizations(&self, path: &str) -> Vec<Option<String>> {
        self.state
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
            .collect()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["phone"] != PHONE || body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid phone or password" })),
        )
            .into_response();
    }

    let access_token = state.valid_token.lock().unwrap().clone();
    Json(json!({
        "accessToken": access_token,
        "refreshToken": "R1",
        "user": { "id": 42, "phone": PHONE, "type": "alumni", "profileImage": null }
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    state.refresh_bodies.lock().unwrap().push(body);

    if state.hold_refresh.load(Ordering::SeqCst) {
        state
            .refresh_gate
            .acquire()
            .await
            .expect("Refresh gate closed")
            .forget();
    }

    let behavior = state.refresh_behavior.lock().unwrap().clone();
    match behavior {
        RefreshBehavior::Issue {
            access_token,
            refresh_token,
        } => {
            *state.valid_token.lock().unwrap() = access_token.clone();
            let mut body = json!({ "accessToken": access_token });
            if let Some(refresh_token) = refresh_token {
                body["refreshToken"] = json!(refresh_token);
            }
            Json(body).into_response()
        }
        RefreshBehavior::Fail(status) => (status, "refresh failed").into_response(),
        RefreshBehavior::Malformed => Json(json!({ "token": "A9" })).into_response(),
        RefreshBehavior::Hang => std::future::pending().await,
    }
}

async fn news(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized("/news", &headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "title": "Homecoming weekend" },
        { "id": 2, "title": "New library wing opens" }
    ]))
    .into_response()
}

async fn event(
    State(state): State<Arc<MockState>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&format!("/events/{}", id), &headers) {
        return unauthorized();
    }
    Json(json!({ "id": id, "title": "Class reunion" })).into_response()
}

async fn create_memory(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !state.authorized("/memories", &headers) {
        return unauthorized();
    }
    body["id"] = json!(10);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn reports(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let auth = state.record("/reports", &headers);

    if state.hold_reports.load(Ordering::SeqCst) {
        state
            .reports_gate
            .acquire()
            .await
            .expect("Reports gate closed")
            .forget();
    }

    let expected = format!("Bearer {}", state.valid_token.lock().unwrap());
    if auth.as_deref() != Some(expected.as_str()) {
        return unauthorized();
    }
    Json(json!({ "total": 2 })).into_response()
}

async fn always_unauthorized(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("/always-401", &headers);
    unauthorized()
}

async fn missing() -> Response {
    (StatusCode::NOT_FOUND, "no such page").into_response()
}

async fn public_courses(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("/public/courses", &headers);
    Json(json!([])).into_response()
}

/// Client wired to a mock API with in-memory storage and location.
pub struct TestClient {
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
    pub location: Arc<Location>,
}

#[allow(dead_code)]
pub fn test_client(api: &MockApi, current_path: &str) -> TestClient {
    test_client_with_refresh_timeout(api, current_path, Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn test_client_with_refresh_timeout(
    api: &MockApi,
    current_path: &str,
    refresh_timeout: Duration,
) -> TestClient {
    let config = Config {
        api_base_url: api.base_url.clone(),
        refresh_timeout,
        ..Config::default()
    };
    let store = Arc::new(MemoryStore::new());
    let location = Arc::new(Location::new(current_path));
    let client =
        ApiClient::new(&config, store.clone(), location.clone()).expect("Failed to build client");

    TestClient {
        client,
        store,
        location,
    }
}

/// Store a logged-in session. `refresh_token: None` leaves it out.
#[allow(dead_code)]
pub fn seed_session(store: &MemoryStore, access_token: &str, refresh_token: Option<&str>) {
    store.set("accessToken", access_token).unwrap();
    store.set("authToken", access_token).unwrap();
    if let Some(refresh_token) = refresh_token {
        store.set("refreshToken", refresh_token).unwrap();
    }
    store
        .set(
            "user",
            r#"{"id":42,"phone":"+15550100","type":"alumni","profileImage":null}"#,
        )
        .unwrap();
}

#[allow(dead_code)]
pub fn assert_store_cleared(store: &MemoryStore) {
    for key in ["accessToken", "authToken", "refreshToken", "user"] {
        assert!(
            store.get(key).unwrap().is_none(),
            "{} should have been cleared",
            key
        );
    }
}

/// Poll `condition` until it holds, failing the test after a few seconds.
#[allow(dead_code)]
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
