use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::listing::ListingKind;

/// Listing collections an order may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Product,
    Skill,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Product => "product",
            ItemType::Skill => "skill",
        }
    }

    pub fn listing_kind(&self) -> ListingKind {
        match self {
            ItemType::Product => ListingKind::Product,
            ItemType::Skill => ListingKind::Skill,
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(ItemType::Product),
            "skill" => Ok(ItemType::Skill),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub item_title: String,
    pub seller_id: Uuid,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub created_at: DateTime<Utc>,
}

/// Buyer-side order intent. Seller and item title are resolved from the
/// referenced listing when the order is stored.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub buyer_address: String,
}

impl NewOrder {
    pub fn into_order(self, seller_id: Uuid, item_title: String) -> Order {
        Order {
            id: Uuid::new_v4(),
            item_id: self.item_id,
            item_type: self.item_type,
            item_title,
            seller_id,
            buyer_name: self.buyer_name,
            buyer_email: self.buyer_email,
            buyer_phone: self.buyer_phone,
            buyer_address: self.buyer_address,
            created_at: Utc::now(),
        }
    }
}
