use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::database::models::reference::search_by_state;
use crate::error::ApiError;
use crate::middleware::{no_results, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub state: Option<String>,
}

/// GET /search-skill?state=... - Case-insensitive state lookup in the
/// predefined skill catalog.
pub async fn search_skill(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let wanted = query.state.unwrap_or_default();
    let records = state.store.list_reference().await?;
    let results = search_by_state(&records, &wanted);

    if results.is_empty() {
        return Ok(no_results("No results found"));
    }

    Ok(ApiResponse::success(results).into_response())
}
