use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{ItemType, NewOrder, Order, Role};
use crate::error::ApiError;
use crate::handlers::extract::extract_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Relation, Subject};
use crate::state::AppState;

use super::current_user;

/// Buyer contact fields are stored as given; they are not cross-checked
/// against the authenticated user. There is no `itemTitle` field, the title
/// comes from the referenced listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default)]
    pub buyer_phone: String,
    #[serde(default)]
    pub buyer_address: String,
}

#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub message: &'static str,
    pub id: Uuid,
}

/// POST /api/placeorder - Record a purchase intent against a product or skill.
///
/// The stored `itemTitle` is copied from the listing at placement time; a
/// title sent by the client is not read.
pub async fn place_order(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<OrderPlaced> {
    let req = extract_json(body)?;
    let not_found = || ApiError::not_found("Item not found");

    // Unknown item types and malformed ids resolve to no item.
    let item_type: ItemType = req.item_type.parse().map_err(|_| not_found())?;
    let item_id = Uuid::parse_str(req.item_id.trim()).map_err(|_| not_found())?;

    let order = state
        .store
        .place_order(NewOrder {
            item_id,
            item_type,
            buyer_name: req.buyer_name,
            buyer_email: req.buyer_email,
            buyer_phone: req.buyer_phone,
            buyer_address: req.buyer_address,
        })
        .await?
        .ok_or_else(not_found)?;

    info!(
        order_id = %order.id,
        item_id = %order.item_id,
        seller_id = %order.seller_id,
        placed_by = %identity.user_id,
        "Order placed"
    );

    Ok(ApiResponse::success(OrderPlaced {
        message: "Order placed",
        id: order.id,
    }))
}

/// GET /api/orders - Orders for the calling seller, oldest first.
pub async fn seller_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> ApiResult<Vec<Order>> {
    let user = current_user(&state, &identity).await?;
    authorize(Subject::user(&identity, &user), Relation::HasRole(Role::Seller))?;

    let orders = state.store.orders_for_seller(user.id).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/buyer-orders - Orders placed with the calling buyer's email,
/// newest first.
pub async fn buyer_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> ApiResult<Vec<Order>> {
    let user = current_user(&state, &identity).await?;
    authorize(Subject::user(&identity, &user), Relation::HasRole(Role::Buyer))?;

    let orders = state.store.orders_for_buyer(&user.email).await?;
    Ok(ApiResponse::success(orders))
}
