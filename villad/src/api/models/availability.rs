//! API models for the public availability endpoints.

use crate::api::models::villas::VillaResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Date-range availability check for a single villa.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub villa_slug: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub available: bool,
    /// Number of confirmed or pending bookings overlapping the range
    pub conflicting_bookings: i64,
}

/// Villa search, optionally narrowed to a date range and category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableVillasRequest {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    /// Category filter; absent or `"all"` matches everything
    pub category: Option<String>,
}

/// A villa in the search result, flagged available when a date range was given.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableVilla {
    #[serde(flatten)]
    pub villa: VillaResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableVillasResponse {
    pub ok: bool,
    pub available_villas: Vec<AvailableVilla>,
    /// Total villas examined (only present when dates were supplied)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_checked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_count: Option<usize>,
}
