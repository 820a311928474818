use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Listing, NewOrder, NewUser, Order, Pitch, PredefinedSkill, Product, Skill, User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. A duplicate email yields `DatabaseError::Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Exact, case-sensitive email lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
}

/// Storage for one listing kind. Lists come back in natural storage order.
#[async_trait]
pub trait ListingRepository<L: Listing>: Send + Sync {
    async fn insert_listing(&self, listing: L) -> Result<L, DatabaseError>;

    async fn list_listings(&self) -> Result<Vec<L>, DatabaseError>;

    async fn find_listing(&self, id: Uuid) -> Result<Option<L>, DatabaseError>;

    /// Returns false when nothing matched `id`.
    async fn delete_listing(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Resolve the referenced listing and store the order as one atomic step.
    /// Returns `None` (and stores nothing) when the listing does not exist.
    async fn place_order(&self, order: NewOrder) -> Result<Option<Order>, DatabaseError>;

    /// Orders whose seller is `seller_id`, oldest first.
    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DatabaseError>;

    /// Orders placed with `buyer_email`, newest first.
    async fn orders_for_buyer(&self, buyer_email: &str) -> Result<Vec<Order>, DatabaseError>;
}

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn list_reference(&self) -> Result<Vec<PredefinedSkill>, DatabaseError>;

    async fn insert_reference(&self, records: Vec<PredefinedSkill>) -> Result<usize, DatabaseError>;

    async fn count_reference(&self) -> Result<i64, DatabaseError>;
}

/// Everything the HTTP surface needs from persistence.
#[async_trait]
pub trait Store:
    UserRepository
    + ListingRepository<Product>
    + ListingRepository<Skill>
    + ListingRepository<Pitch>
    + OrderRepository
    + ReferenceRepository
{
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
