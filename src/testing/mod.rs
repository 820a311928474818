//! In-process fixtures for router tests: a memory-backed `AppState`, a
//! throwaway upload directory and request helpers driven through `oneshot`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::models::PredefinedSkill;
use crate::database::{MemoryStore, ReferenceRepository};
use crate::routes;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "router-test-secret";

pub struct TestContext {
    pub state: AppState,
    // Held so the upload directory lives as long as the context.
    upload_dir: TempDir,
}

/// A signed-up account and the token returned for it.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub email: String,
    pub token: String,
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        let upload_dir = tempfile::tempdir()?;

        let mut config = AppConfig::development();
        config.security.jwt_secret = TEST_JWT_SECRET.to_string();
        config.files.upload_dir = upload_dir.path().to_path_buf();
        config.files.public_dir = upload_dir.path().join("public");

        let store = Arc::new(MemoryStore::new());
        Ok(Self {
            state: AppState::new(store, config),
            upload_dir,
        })
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        self.upload_dir.path()
    }

    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    pub async fn seed_reference(&self, records: Vec<PredefinedSkill>) -> anyhow::Result<()> {
        self.state.store.insert_reference(records).await?;
        Ok(())
    }

    pub async fn send(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.send(request(Method::GET, uri, token, Body::empty(), None)?).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.send(request(Method::DELETE, uri, token, Body::empty(), None)?).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let body = Body::from(serde_json::to_vec(&body)?);
        self.send(request(Method::POST, uri, token, body, Some("application/json"))?).await
    }

    /// Sign up a fresh account with a unique email.
    pub async fn signup(&self, role: &str) -> anyhow::Result<TestAccount> {
        let email = format!("{}-{}@example.com", role, Uuid::new_v4().simple());
        let (status, body) = self
            .post_json(
                "/api/signup",
                None,
                json!({
                    "name": "Test User",
                    "email": email,
                    "password": "hunter22",
                    "role": role,
                    "address": "1 Test Lane",
                    "phone": "555-0100"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "signup failed: {} {}", status, body);

        let token = body["data"]["token"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("signup response without token: {}", body))?
            .to_string();
        Ok(TestAccount { email, token })
    }
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    Ok(builder.body(body)?)
}

/// Hand-built multipart/form-data body. Parts are `(name, file_name, content)`.
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
            }
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
