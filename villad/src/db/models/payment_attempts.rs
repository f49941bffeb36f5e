//! Database models for payment attempts.

use crate::types::PaymentAttemptId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a hosted-payment-page attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Initiated,
    Ok,
    Fail,
}

/// Database request for recording a newly initialized attempt
#[derive(Debug, Clone)]
pub struct PaymentAttemptCreateDBRequest {
    pub oid: String,
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub metadata: serde_json::Value,
}

/// Database response for a payment attempt
#[derive(Debug, Clone)]
pub struct PaymentAttemptDBResponse {
    pub id: PaymentAttemptId,
    pub oid: String,
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub metadata: serde_json::Value,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
