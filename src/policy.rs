//! Authorization checks shared by every ownership- or role-gated route.

use uuid::Uuid;

use crate::database::models::{Listing, Role, User};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// What the caller must be with respect to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The caller's id equals the resource owner's id.
    OwnerOf(Uuid),
    /// The caller's stored role is exactly this role.
    HasRole(Role),
}

impl Relation {
    pub fn owner_of<L: Listing>(listing: &L) -> Self {
        Relation::OwnerOf(listing.seller_id())
    }
}

/// Subject of an authorization decision: the token identity, plus the stored
/// user when the route has loaded it.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub identity: &'a AuthUser,
    pub user: Option<&'a User>,
}

impl<'a> Subject<'a> {
    pub fn token(identity: &'a AuthUser) -> Self {
        Self { identity, user: None }
    }

    pub fn user(identity: &'a AuthUser, user: &'a User) -> Self {
        Self { identity, user: Some(user) }
    }
}

pub fn authorize(subject: Subject<'_>, relation: Relation) -> Result<(), ApiError> {
    let allowed = match relation {
        Relation::OwnerOf(owner) => subject.identity.user_id == owner,
        Relation::HasRole(role) => subject.user.map(|u| u.role) == Some(role),
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(user_id = %subject.identity.user_id, ?relation, "Access denied");
        Err(ApiError::forbidden("Access denied"))
    }
}
