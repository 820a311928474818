use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ItemType, Listing, NewOrder, NewUser, Order, Pitch, PredefinedSkill, Product, Skill, User,
};
use crate::database::repository::{
    ListingRepository, OrderRepository, ReferenceRepository, Store, UserRepository,
};

/// Insertion-ordered, process-local store used for development and tests.
///
/// Lock order is listing table before `orders`; `place_order` keeps the
/// listing read guard while appending so a delete cannot interleave.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    skills: RwLock<Vec<Skill>>,
    pitches: RwLock<Vec<Pitch>>,
    orders: RwLock<Vec<Order>>,
    reference: RwLock<Vec<PredefinedSkill>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_owner<L: Listing>(table: &[L], id: Uuid) -> Option<(Uuid, String)> {
    table
        .iter()
        .find(|l| l.id() == id)
        .map(|l| (l.seller_id(), l.title().to_string()))
}

/// Maps a listing type to its table inside `MemoryStore`.
pub trait MemoryListing: Listing {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>>;
}

impl MemoryListing for Product {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.products
    }
}

impl MemoryListing for Skill {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.skills
    }
}

impl MemoryListing for Pitch {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.pitches
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("User already exists".to_string()));
        }
        let user = user.into_user();
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl<L: MemoryListing> ListingRepository<L> for MemoryStore {
    async fn insert_listing(&self, listing: L) -> Result<L, DatabaseError> {
        L::table(self).write().await.push(listing.clone());
        Ok(listing)
    }

    async fn list_listings(&self) -> Result<Vec<L>, DatabaseError> {
        Ok(L::table(self).read().await.clone())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<L>, DatabaseError> {
        Ok(L::table(self).read().await.iter().find(|l| l.id() == id).cloned())
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut table = L::table(self).write().await;
        let before = table.len();
        table.retain(|l| l.id() != id);
        Ok(table.len() != before)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place_order(&self, order: NewOrder) -> Result<Option<Order>, DatabaseError> {
        // Hold the listing guard across the append; see the lock order above.
        match order.item_type {
            ItemType::Product => {
                let products = self.products.read().await;
                let Some((seller_id, title)) = find_owner(products.as_slice(), order.item_id) else {
                    return Ok(None);
                };
                let order = order.into_order(seller_id, title);
                self.orders.write().await.push(order.clone());
                Ok(Some(order))
            }
            ItemType::Skill => {
                let skills = self.skills.read().await;
                let Some((seller_id, title)) = find_owner(skills.as_slice(), order.item_id) else {
                    return Ok(None);
                };
                let order = order.into_order(seller_id, title);
                self.orders.write().await.push(order.clone());
                Ok(Some(order))
            }
        }
    }

    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DatabaseError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn orders_for_buyer(&self, buyer_email: &str) -> Result<Vec<Order>, DatabaseError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .rev()
            .filter(|o| o.buyer_email == buyer_email)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReferenceRepository for MemoryStore {
    async fn list_reference(&self) -> Result<Vec<PredefinedSkill>, DatabaseError> {
        Ok(self.reference.read().await.clone())
    }

    async fn insert_reference(&self, records: Vec<PredefinedSkill>) -> Result<usize, DatabaseError> {
        let count = records.len();
        self.reference.write().await.extend(records);
        Ok(count)
    }

    async fn count_reference(&self) -> Result<i64, DatabaseError> {
        Ok(self.reference.read().await.len() as i64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
