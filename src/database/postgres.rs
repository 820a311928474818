use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ItemType, Listing, NewOrder, NewUser, Order, Pitch, PredefinedSkill, Product, Role, Skill, User,
};
use crate::database::repository::{
    ListingRepository, OrderRepository, ReferenceRepository, Store, UserRepository,
};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed store. Natural storage order is the `seq` column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bindable column value for generic listing inserts.
pub enum ColumnValue {
    Uuid(Uuid),
    Text(String),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

/// A listing that knows its own insert columns.
pub trait PgListing: Listing + for<'r> FromRow<'r, PgRow> {
    fn insert_values(&self) -> Vec<(&'static str, ColumnValue)>;
}

impl PgListing for Product {
    fn insert_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("id", ColumnValue::Uuid(self.id)),
            ("title", ColumnValue::Text(self.title.clone())),
            ("price", ColumnValue::Float(self.price)),
            ("story", ColumnValue::Text(self.story.clone())),
            ("image", ColumnValue::Text(self.image.clone())),
            ("seller_id", ColumnValue::Uuid(self.seller_id)),
            ("created_at", ColumnValue::Timestamp(self.created_at)),
        ]
    }
}

impl PgListing for Skill {
    fn insert_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("id", ColumnValue::Uuid(self.id)),
            ("title", ColumnValue::Text(self.title.clone())),
            ("story", ColumnValue::Text(self.story.clone())),
            ("contact", ColumnValue::Text(self.contact.clone())),
            ("seller_id", ColumnValue::Uuid(self.seller_id)),
            ("created_at", ColumnValue::Timestamp(self.created_at)),
        ]
    }
}

impl PgListing for Pitch {
    fn insert_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("id", ColumnValue::Uuid(self.id)),
            ("title", ColumnValue::Text(self.title.clone())),
            ("description", ColumnValue::Text(self.description.clone())),
            ("funding", ColumnValue::Float(self.funding)),
            ("seller_id", ColumnValue::Uuid(self.seller_id)),
            ("created_at", ColumnValue::Timestamp(self.created_at)),
        ]
    }
}

// Rows carrying TEXT-encoded enums are decoded through these and validated.

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    address: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| DatabaseError::Corrupt(format!("users.role for {}: {}", row.id, e)))?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            address: row.address,
            phone: row.phone,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    item_id: Uuid,
    item_type: String,
    item_title: String,
    seller_id: Uuid,
    buyer_name: String,
    buyer_email: String,
    buyer_phone: String,
    buyer_address: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DatabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let item_type: ItemType = row
            .item_type
            .parse()
            .map_err(|e| DatabaseError::Corrupt(format!("orders.item_type for {}: {}", row.id, e)))?;
        Ok(Order {
            id: row.id,
            item_id: row.item_id,
            item_type,
            item_title: row.item_title,
            seller_id: row.seller_id,
            buyer_name: row.buyer_name,
            buyer_email: row.buyer_email,
            buyer_phone: row.buyer_phone,
            buyer_address: row.buyer_address,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, address, phone, created_at";

const ORDER_COLUMNS: &str = "id, item_id, item_type, item_title, seller_id, buyer_name, buyer_email, buyer_phone, buyer_address, created_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn collect_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, DatabaseError> {
    rows.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let user = user.into_user();
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, address, phone, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.address)
        .bind(&user.phone)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(DatabaseError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl<L: PgListing> ListingRepository<L> for PgStore {
    async fn insert_listing(&self, listing: L) -> Result<L, DatabaseError> {
        let values = listing.insert_values();

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (", L::KIND.table()));
        {
            let mut columns = builder.separated(", ");
            for (name, _) in &values {
                columns.push(*name);
            }
        }
        builder.push(") VALUES (");
        {
            let mut binds = builder.separated(", ");
            for (_, value) in values {
                match value {
                    ColumnValue::Uuid(v) => binds.push_bind(v),
                    ColumnValue::Text(v) => binds.push_bind(v),
                    ColumnValue::Float(v) => binds.push_bind(v),
                    ColumnValue::Timestamp(v) => binds.push_bind(v),
                };
            }
        }
        builder.push(")");

        builder.build().execute(&self.pool).await?;
        Ok(listing)
    }

    async fn list_listings(&self) -> Result<Vec<L>, DatabaseError> {
        let sql = format!("SELECT * FROM {} ORDER BY seq", L::KIND.table());
        let rows = sqlx::query_as::<_, L>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<L>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", L::KIND.table());
        let row = sqlx::query_as::<_, L>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", L::KIND.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn place_order(&self, order: NewOrder) -> Result<Option<Order>, DatabaseError> {
        // Seller and title are read from the listing inside the same statement,
        // so a concurrent delete either precedes the insert or misses it.
        let sql = format!(
            "INSERT INTO orders ({columns})
             SELECT $1, l.id, $2, l.title, l.seller_id, $3, $4, $5, $6, now()
             FROM {table} l WHERE l.id = $7
             RETURNING {columns}",
            columns = ORDER_COLUMNS,
            table = order.item_type.listing_kind().table(),
        );

        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(order.item_type.as_str())
            .bind(&order.buyer_name)
            .bind(&order.buyer_email)
            .bind(&order.buyer_phone)
            .bind(&order.buyer_address)
            .bind(order.item_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DatabaseError> {
        let sql = format!("SELECT {} FROM orders WHERE seller_id = $1 ORDER BY seq", ORDER_COLUMNS);
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;
        collect_orders(rows)
    }

    async fn orders_for_buyer(&self, buyer_email: &str) -> Result<Vec<Order>, DatabaseError> {
        let sql = format!("SELECT {} FROM orders WHERE buyer_email = $1 ORDER BY seq DESC", ORDER_COLUMNS);
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(buyer_email)
            .fetch_all(&self.pool)
            .await?;
        collect_orders(rows)
    }
}

#[async_trait]
impl ReferenceRepository for PgStore {
    async fn list_reference(&self) -> Result<Vec<PredefinedSkill>, DatabaseError> {
        let rows = sqlx::query_as::<_, PredefinedSkill>(
            "SELECT state, district, skill, whats_new FROM predefined_skills ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_reference(&self, records: Vec<PredefinedSkill>) -> Result<usize, DatabaseError> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                "INSERT INTO predefined_skills (state, district, skill, whats_new) VALUES ($1, $2, $3, $4)",
            )
            .bind(record.state)
            .bind(record.district)
            .bind(record.skill)
            .bind(record.whats_new)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(count)
    }

    async fn count_reference(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predefined_skills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
