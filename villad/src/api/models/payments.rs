//! API models for payment initialization.
//!
//! The gateway callback endpoints consume `application/x-www-form-urlencoded`
//! bodies with arbitrary keys, so they use a plain map rather than a typed
//! model; see the payments handler.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Hosted-payment-page initialization request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentInitRequest {
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub email: Option<String>,
    /// Caller metadata stored with the attempt (e.g. `bookingId`); string
    /// values are also forwarded as extra gateway form fields.
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
}

/// Everything the frontend needs to auto-submit the gateway form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentInitResponse {
    /// Gateway endpoint the form posts to
    pub gate: String,
    /// Signed form fields, hash included
    pub fields: BTreeMap<String, String>,
    /// Order id assigned to this attempt
    pub oid: String,
}
