#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use car_genius::{
    app,
    auth::TokenIssuer,
    config::AppConfig,
    database::{Collection, DocumentStore, MemoryStore},
    AppState,
};
use reqwest::{header, Response, StatusCode};
use serde_json::Value;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with `email` and return the raw `token` cookie value.
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/jwt"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        token_from(&res).context("login response did not set a token cookie")
    }

    pub async fn seed(&self, collection: Collection, doc: Value) -> Result<String> {
        let Value::Object(map) = doc else {
            anyhow::bail!("seed document must be an object");
        };
        let result = self.store.insert_one(collection, map).await?;
        Ok(result.inserted_id.to_string())
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Start the router over a fresh in-memory store on an unused port.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(|_| {}).await
}

pub async fn spawn_server_with<F>(configure: F) -> Result<TestServer>
where
    F: FnOnce(&mut AppConfig),
{
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut config = AppConfig::from_source(|_| None);
    config.security.token_secret = TEST_SECRET.to_string();
    configure(&mut config);

    let tokens = TokenIssuer::new(&config.security.token_secret, config.security.token_ttl()?)?;
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), tokens, config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    let server = TestServer {
        port,
        base_url,
        store,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Value of the `token` cookie set by a response, if any.
pub fn token_from(res: &Response) -> Option<String> {
    set_cookie_headers(res).into_iter().find_map(|cookie| {
        let first = cookie.split(';').next()?.trim();
        first.strip_prefix("token=").map(str::to_owned)
    })
}

pub fn set_cookie_headers(res: &Response) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

pub fn cookie_header(token: &str) -> String {
    format!("token={}", token)
}
