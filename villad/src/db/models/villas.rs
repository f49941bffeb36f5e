//! Database models for villas.

use crate::api::models::villas::{VillaCreate, VillaUpdate};
use crate::types::VillaId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a new villa
#[derive(Debug, Clone)]
pub struct VillaCreateDBRequest {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
}

impl From<VillaCreate> for VillaCreateDBRequest {
    fn from(api: VillaCreate) -> Self {
        Self {
            slug: api.slug,
            name: api.name,
            category: api.category,
            price: api.price,
            description: api.description,
        }
    }
}

/// Database request for updating a villa
#[derive(Debug, Clone)]
pub struct VillaUpdateDBRequest {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

impl From<VillaUpdate> for VillaUpdateDBRequest {
    fn from(api: VillaUpdate) -> Self {
        Self {
            slug: api.slug,
            name: api.name,
            category: api.category,
            price: api.price,
            description: api.description,
        }
    }
}

/// Database response for a villa
#[derive(Debug, Clone)]
pub struct VillaDBResponse {
    pub id: VillaId,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
