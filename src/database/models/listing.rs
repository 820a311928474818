use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The three seller-owned collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Product,
    Skill,
    Pitch,
}

impl ListingKind {
    pub fn table(&self) -> &'static str {
        match self {
            ListingKind::Product => "products",
            ListingKind::Skill => "skills",
            ListingKind::Pitch => "pitches",
        }
    }

    /// Capitalised noun used in client messages ("Product not found").
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::Product => "Product",
            ListingKind::Skill => "Skill",
            ListingKind::Pitch => "Pitch",
        }
    }
}

/// A seller-created item. Every listing has exactly one owning seller; the
/// kind-specific fields arrive as a `Draft`.
pub trait Listing: Serialize + Clone + Send + Sync + Unpin + 'static {
    type Draft: Send + Sync + 'static;

    const KIND: ListingKind;

    fn from_draft(seller_id: Uuid, draft: Self::Draft) -> Self;

    fn id(&self) -> Uuid;

    fn seller_id(&self) -> Uuid;

    fn title(&self) -> &str;
}

/// Parse a monetary amount typed as text. Only finite numbers are accepted.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts `5000`, `5000.5` or `"5000"`; form clients send numbers as text.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(v) if v.is_finite() => Ok(v),
        Amount::Number(v) => Err(de::Error::custom(format!("amount must be finite, got {}", v))),
        Amount::Text(raw) => parse_amount(&raw)
            .ok_or_else(|| de::Error::custom(format!("amount must be a number, got {:?}", raw))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub story: String,
    /// Public path of the uploaded image, e.g. `/uploads/1700000000000.jpg`
    pub image: String,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    pub story: String,
    pub image: String,
}

impl Listing for Product {
    type Draft = ProductDraft;

    const KIND: ListingKind = ListingKind::Product;

    fn from_draft(seller_id: Uuid, draft: ProductDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            price: draft.price,
            story: draft.story,
            image: draft.image,
            seller_id,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn seller_id(&self) -> Uuid {
        self.seller_id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub title: String,
    pub story: String,
    pub contact: String,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub contact: String,
}

impl Listing for Skill {
    type Draft = SkillDraft;

    const KIND: ListingKind = ListingKind::Skill;

    fn from_draft(seller_id: Uuid, draft: SkillDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            story: draft.story,
            contact: draft.contact,
            seller_id,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn seller_id(&self) -> Uuid {
        self.seller_id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pitch {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub funding: f64,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PitchDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub funding: f64,
}

impl Listing for Pitch {
    type Draft = PitchDraft;

    const KIND: ListingKind = ListingKind::Pitch;

    fn from_draft(seller_id: Uuid, draft: PitchDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            funding: draft.funding,
            seller_id,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn seller_id(&self) -> Uuid {
        self.seller_id
    }

    fn title(&self) -> &str {
        &self.title
    }
}
