use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use skillmarket_api::config::AppConfig;
use skillmarket_api::database::seed::seed_if_empty;
use skillmarket_api::database::MemoryStore;
use skillmarket_api::routes;
use skillmarket_api::state::AppState;

/// A server bound to an ephemeral port on the test's own runtime. The serve
/// task ends when the test's runtime shuts down.
pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    upload_dir: tempfile::TempDir,
}

pub async fn start_server() -> Result<TestServer> {
    let upload_dir = tempfile::tempdir().context("failed to create upload dir")?;

    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.files.upload_dir = upload_dir.path().to_path_buf();
    config.files.public_dir = upload_dir.path().join("public");

    // In-memory storage keeps the suite independent of a database
    let store = Arc::new(MemoryStore::new());
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/predefined_skills.json");
    seed_if_empty(store.as_ref(), &fixtures)
        .await
        .context("failed to load reference fixtures")?;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let app = routes::app(AppState::new(store, config));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    let server = TestServer { base_url, upload_dir };
    server.wait_ready().await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self) -> Result<()> {
        let res = reqwest::get(format!("{}/health", self.base_url)).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "health check returned {}", res.status());
        Ok(())
    }
}

/// Sign up a fresh account and return `(email, token)`.
#[allow(dead_code)]
pub async fn signup(server: &TestServer, role: &str) -> Result<(String, String)> {
    let email = format!("{}-{}@example.com", role, uuid::Uuid::new_v4().simple());
    let res = reqwest::Client::new()
        .post(format!("{}/api/signup", server.base_url))
        .json(&json!({
            "name": "Integration User",
            "email": email,
            "password": "correct horse",
            "role": role,
            "address": "7 Weaver Row",
            "phone": "555-0123"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "signup failed: {}", res.status());

    let body: Value = res.json().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("signup response without token")?
        .to_string();
    Ok((email, token))
}
