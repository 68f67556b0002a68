#![allow(dead_code)]

use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use catalog_api::config::AppConfig;
use catalog_api::state::AppState;

pub use catalog_api::database::Repository;

pub const DEFAULT_NAME: &str = "AAAAAAAAAA";
pub const UPDATED_NAME: &str = "BBBBBBBBBB";
pub const DEFAULT_EMAIL: &str = "AAAAAAAAAA";
pub const UPDATED_EMAIL: &str = "BBBBBBBBBB";

pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// App running in-process on its own port with fresh in-memory storage.
/// `state` shares the server's repositories so tests can inspect them directly.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn user_count(&self) -> Result<u64> {
        Ok(self.state.users.count().await?)
    }

    pub async fn product_count(&self) -> Result<u64> {
        Ok(self.state.products.count().await?)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::in_memory();
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    let app = catalog_api::app(state.clone(), &config);

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        port,
        base_url,
        state,
        client: reqwest::Client::new(),
    })
}
