// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Alumni Portal command-line client
//!
//! Signs in to the portal API, keeps the session in a local credentials
//! file, and issues authenticated requests with automatic token refresh.

use alumni_portal::{
    config::Config, navigation::Location, store::FileStore, ApiClient, ApiRequest,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "alumni-portal", version, about = "Alumni portal API client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        phone: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user
    Whoami,
    /// GET an API path and print the JSON response
    Get {
        /// Path relative to the API base URL, e.g. /news
        path: String,
    },
    /// Clear the stored session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    let store = FileStore::open(&config.credentials_path).with_context(|| {
        format!(
            "Failed to open credentials file {}",
            config.credentials_path.display()
        )
    })?;
    let location = Arc::new(Location::new("/dashboard"));
    let client = ApiClient::new(&config, Arc::new(store), location)?;

    match cli.command {
        Command::Login { phone, password } => {
            let session = client
                .login(&phone, &password)
                .await
                .context("Login failed")?;
            println!(
                "Signed in as {} ({:?})",
                session.user.phone, session.user.user_type
            );
        }
        Command::Whoami => match client.current_user()? {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => println!("Not signed in"),
        },
        Command::Get { path } => {
            let response = client.send(ApiRequest::get(path)).await?;
            let body: serde_json::Value = response.json()?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
    }

    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("alumni_portal=info,warn")),
        )
        .with(format)
        .init();
}
