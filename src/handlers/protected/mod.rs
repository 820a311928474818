// handlers/protected/mod.rs - Protected handlers (bearer JWT required)
//
// Every route in this tier sits behind `jwt_auth_middleware`, which places an
// `AuthUser` in the request extensions.

pub mod listings;
pub mod orders;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Load the stored user behind a token. A token for a user that no longer
/// exists is treated like any other invalid credential.
pub async fn current_user(state: &AppState, identity: &AuthUser) -> Result<User, ApiError> {
    state
        .store
        .find_user(identity.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %identity.user_id, "Token refers to unknown user");
            ApiError::unauthorized("Unauthorized")
        })
}
