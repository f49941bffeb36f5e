//! API request/response models for villas.

use crate::db::models::villas::VillaDBResponse;
use crate::types::VillaId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VillaCreate {
    pub slug: String,
    pub name: String,
    /// Category label, e.g. `VIP` or `PREMIUM`
    pub category: String,
    /// Nightly price (sent/returned as string to preserve precision)
    #[schema(value_type = String)]
    pub price: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VillaUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VillaResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VillaId,
    pub slug: String,
    pub name: String,
    pub category: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VillaDBResponse> for VillaResponse {
    fn from(db: VillaDBResponse) -> Self {
        Self {
            id: db.id,
            slug: db.slug,
            name: db.name,
            category: db.category,
            price: db.price,
            description: db.description,
            created_at: db.created_at,
        }
    }
}

/// Compact villa embedded in admin booking listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VillaSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: VillaId,
    pub name: String,
    pub slug: String,
    pub category: String,
}

impl From<VillaDBResponse> for VillaSummary {
    fn from(db: VillaDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            slug: db.slug,
            category: db.category,
        }
    }
}
