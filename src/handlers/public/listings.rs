use axum::extract::State;

use crate::database::models::Listing;
use crate::database::{ListingRepository, Store};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/products | /api/skills | /api/pitches - Every listing of one
/// kind in storage order.
pub async fn list<L>(State(state): State<AppState>) -> ApiResult<Vec<L>>
where
    L: Listing,
    dyn Store: ListingRepository<L>,
{
    let listings = ListingRepository::<L>::list_listings(state.store.as_ref()).await?;
    Ok(ApiResponse::success(listings))
}
