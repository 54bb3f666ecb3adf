// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed CRUD access to the portal's resource endpoints.

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::marker::PhantomData;

/// Resource collection paths.
pub mod paths {
    pub const NEWS: &str = "/news";
    pub const EVENTS: &str = "/events";
    pub const FACULTY: &str = "/faculty";
    pub const COURSES: &str = "/courses";
    pub const NOTIFICATIONS: &str = "/notifications";
    pub const MEMORIES: &str = "/memories";
    pub const OCCUPATIONS: &str = "/occupations";
    pub const ALUMNI: &str = "/alumni";
}

/// A collection endpoint whose items deserialize into `T`.
///
/// Every call goes through [`ApiClient::send`], so token refresh applies.
pub struct Resource<T = serde_json::Value> {
    client: ApiClient,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(client: ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// List items, passing `query` through as URL parameters.
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<T>> {
        self.client
            .send(ApiRequest::get(self.path).query(query))
            .await?
            .json()
    }

    pub async fn get(&self, id: impl Display) -> Result<T> {
        self.client.get_json(&self.item_path(id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T> {
        self.client.post_json(self.path, body).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: impl Display, body: &B) -> Result<T> {
        self.client.put_json(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<()> {
        self.client.delete(&self.item_path(id)).await
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.path, id)
    }
}

/// Shorthand constructors for the portal's collections.
impl ApiClient {
    pub fn news(&self) -> Resource {
        Resource::new(self.clone(), paths::NEWS)
    }

    pub fn events(&self) -> Resource {
        Resource::new(self.clone(), paths::EVENTS)
    }

    pub fn faculty(&self) -> Resource {
        Resource::new(self.clone(), paths::FACULTY)
    }

    pub fn courses(&self) -> Resource {
        Resource::new(self.clone(), paths::COURSES)
    }

    pub fn notifications(&self) -> Resource {
        Resource::new(self.clone(), paths::NOTIFICATIONS)
    }

    pub fn memories(&self) -> Resource {
        Resource::new(self.clone(), paths::MEMORIES)
    }

    pub fn occupations(&self) -> Resource {
        Resource::new(self.clone(), paths::OCCUPATIONS)
    }

    pub fn alumni(&self) -> Resource {
        Resource::new(self.clone(), paths::ALUMNI)
    }
}
