//! Test helpers for integration tests
//!
//! Spawns the API server and the realtime gateway on ephemeral ports and
//! wraps the HTTP calls the tests make.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use stay_common::AppConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Bind `app` to a free local port and serve it in the background
async fn spawn_app(app: Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok((addr, handle))
}

/// API server instance that lives as long as the test
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub config: AppConfig,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start an API server from the environment configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start an API server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = stay_api::create_app_state(config.clone()).await?;
        let (addr, handle) = spawn_app(stay_api::create_app(state)).await?;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            config,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Realtime gateway instance
pub struct TestGateway {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestGateway {
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = stay_realtime::create_gateway_state(config).await?;
        let (addr, handle) = spawn_app(stay_realtime::create_app(state)).await?;
        Ok(Self { addr, handle })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Configuration from the environment, tuned for tests
///
/// The scheduled-message dispatcher is never started by [`TestServer`], and
/// the rate limit is raised so parallel tests do not trip it.
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config =
        AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config.rate_limit.requests_per_second = 10_000;
    config.rate_limit.burst = 10_000;
    config.webhooks.beds24_secret = None;
    Ok(config)
}

/// Whether the backing services for end-to-end tests are configured
pub async fn check_test_env() -> bool {
    for var in ["DATABASE_URL", "REDIS_URL", "JWT_SECRET"] {
        if std::env::var(var).is_err() {
            eprintln!("Skipping test: {var} not set");
            return false;
        }
    }
    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Missing error code in {body}"))
}
