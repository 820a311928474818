use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        Path, State,
    },
    Extension, Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{parse_amount, Listing, Product, ProductDraft};
use crate::database::{ListingRepository, Store};
use crate::error::ApiError;
use crate::handlers::extract::extract_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Relation, Subject};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListingCreated {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ListingDeleted {
    pub message: String,
    pub id: Uuid,
}

async fn store_listing<L>(state: &AppState, identity: &AuthUser, draft: L::Draft) -> ApiResult<ListingCreated>
where
    L: Listing,
    dyn Store: ListingRepository<L>,
{
    let listing = L::from_draft(identity.user_id, draft);
    let listing = ListingRepository::<L>::insert_listing(state.store.as_ref(), listing).await?;

    info!(
        kind = L::KIND.label(),
        id = %listing.id(),
        seller_id = %listing.seller_id(),
        "Listing created"
    );

    Ok(ApiResponse::success(ListingCreated {
        message: format!("{} uploaded", L::KIND.label()),
        id: listing.id(),
    }))
}

/// POST /api/teach | /api/pitches - Create a listing owned by the caller.
pub async fn create<L>(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    body: Result<Json<L::Draft>, JsonRejection>,
) -> ApiResult<ListingCreated>
where
    L: Listing,
    L::Draft: DeserializeOwned,
    dyn Store: ListingRepository<L>,
{
    let draft = extract_json(body)?;
    store_listing::<L>(&state, &identity, draft).await
}

/// POST /api/products - multipart form with `title`, `price`, `story` and an
/// `image` file. The image is written before the record is created.
pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ListingCreated> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let form = ProductForm::read(&mut multipart).await?;

    let price = parse_price(&form.price)?;
    let (file_name, bytes) = form
        .image
        .ok_or_else(|| ApiError::bad_request("image is required"))?;

    let image = state.uploads.save(file_name.as_deref(), &bytes).await?;

    let draft = ProductDraft {
        title: form.title,
        price,
        story: form.story,
        image,
    };
    store_listing::<Product>(&state, &identity, draft).await
}

#[derive(Default)]
struct ProductForm {
    title: String,
    price: String,
    story: String,
    image: Option<(Option<String>, Vec<u8>)>,
}

impl ProductForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.image = Some((file_name, bytes.to_vec()));
                }
                "title" => form.title = field.text().await?,
                "price" => form.price = field.text().await?,
                "story" => form.story = field.text().await?,
                _ => {}
            }
        }

        Ok(form)
    }
}

fn parse_price(raw: &str) -> Result<f64, ApiError> {
    parse_amount(raw).ok_or_else(|| ApiError::bad_request("price must be a number"))
}

/// DELETE /api/products/:id | /api/skills/:id | /api/pitches/:id - Only the
/// owning seller may delete.
pub async fn delete<L>(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ListingDeleted>
where
    L: Listing,
    dyn Store: ListingRepository<L>,
{
    let not_found = || ApiError::not_found(format!("{} not found", L::KIND.label()));
    let store = state.store.as_ref();

    // An id that cannot be parsed matches no record.
    let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
    let listing = ListingRepository::<L>::find_listing(store, id)
        .await?
        .ok_or_else(not_found)?;

    authorize(Subject::token(&identity), Relation::owner_of(&listing))?;

    if !ListingRepository::<L>::delete_listing(store, id).await? {
        return Err(not_found());
    }

    info!(kind = L::KIND.label(), %id, seller_id = %identity.user_id, "Listing deleted");

    Ok(ApiResponse::success(ListingDeleted {
        message: format!("{} deleted", L::KIND.label()),
        id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_must_be_finite_numbers() {
        assert_eq!(parse_price(" 249.5 ").unwrap(), 249.5);
        assert!(parse_price("").is_err());
        assert!(parse_price("cheap").is_err());
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
    }
}
