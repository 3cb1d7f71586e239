use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starting_bid: Decimal,
    pub photo: Option<String>,
    pub active: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ListingDetail {
    pub listing_id: Uuid,
    pub created_by: Uuid,
    pub seller: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of every listing index (home page, category filter, wishlist).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starting_bid: Decimal,
    pub photo: Option<String>,
    pub active: bool,
    pub current_bid: Option<Decimal>,
    pub on_wishlist: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bid {
    pub id: Uuid,
    pub amount: Decimal,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub username: String,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}
