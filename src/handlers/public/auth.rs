use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::database::models::{NewUser, Role};
use crate::error::ApiError;
use crate::handlers::extract::{extract_json, extract_validated_json, require_fields, Validate};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

/// Only the credential fields are required; contact details may be blank.
impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_fields(&[
            ("email", &self.email),
            ("password", &self.password),
            ("role", &self.role),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// POST /api/signup - Create an account and return a token.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<SignupResponse> {
    let req = extract_validated_json(body)?;
    let role: Role = req
        .role
        .parse()
        .map_err(|_| ApiError::bad_request("role must be 'seller' or 'buyer'"))?;

    if state.store.find_user_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "Signup rejected: email already registered");
        return Err(ApiError::conflict("User already exists"));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Server error")
        })??;

    let user = state
        .store
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
            address: req.address,
            phone: req.phone,
        })
        .await?;

    let token = issue_token(user.id, &state.config.security)?;
    info!(user_id = %user.id, role = %user.role, "User signed up");

    Ok(ApiResponse::success(SignupResponse {
        token,
        role: user.role,
        name: user.name,
    }))
}

/// POST /api/login - Verify credentials and return a fresh token.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let req = extract_json(body)?;
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let Some(user) = state.store.find_user_by_email(&req.email).await? else {
        warn!(email = %req.email, "Login failed: unknown email");
        return Err(invalid());
    };

    let stored_hash = user.password_hash.clone();
    let password = req.password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("Server error")
        })??;

    if !matches {
        warn!(email = %user.email, "Login failed: wrong password");
        return Err(invalid());
    }

    let token = issue_token(user.id, &state.config.security)?;
    info!(user_id = %user.id, email = %user.email, role = %user.role, "User logged in");

    Ok(ApiResponse::success(LoginResponse {
        token,
        role: user.role,
        name: user.name,
        email: user.email,
        address: user.address,
        phone: user.phone,
    }))
}
