//! Database repository for payment attempts.
//!
//! Attempts are keyed by their gateway order id (`oid`) rather than the row
//! UUID, because callbacks identify themselves with the oid we handed out at
//! init time. This repository does not implement the full CRUD trait; the
//! lifecycle is insert, look up by oid, settle.

use crate::db::{
    errors::Result,
    models::payment_attempts::{PaymentAttemptCreateDBRequest, PaymentAttemptDBResponse, PaymentStatus},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct PaymentAttempts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PaymentAttempts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(oid = %request.oid), err)]
    pub async fn create(&mut self, request: &PaymentAttemptCreateDBRequest) -> Result<PaymentAttemptDBResponse> {
        let attempt_id = Uuid::new_v4();

        let attempt = sqlx::query_as!(
            PaymentAttemptDBResponse,
            r#"
            INSERT INTO payment_attempts (id, oid, amount, currency, email, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, oid, amount, currency, email, metadata, status AS "status: PaymentStatus", created_at, updated_at
            "#,
            attempt_id,
            request.oid,
            request.amount,
            request.currency,
            request.email,
            request.metadata,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(attempt)
    }

    #[instrument(skip(self), fields(oid = %oid), err)]
    pub async fn get_by_oid(&mut self, oid: &str) -> Result<Option<PaymentAttemptDBResponse>> {
        let attempt = sqlx::query_as!(
            PaymentAttemptDBResponse,
            r#"
            SELECT id, oid, amount, currency, email, metadata, status AS "status: PaymentStatus", created_at, updated_at
            FROM payment_attempts WHERE oid = $1
            "#,
            oid
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(attempt)
    }

    /// Record the gateway's verdict for an attempt.
    ///
    /// Returns the settled attempt, or `None` when the oid was never issued.
    #[instrument(skip(self), fields(oid = %oid), err)]
    pub async fn settle(&mut self, oid: &str, status: PaymentStatus) -> Result<Option<PaymentAttemptDBResponse>> {
        let attempt = sqlx::query_as!(
            PaymentAttemptDBResponse,
            r#"
            UPDATE payment_attempts SET status = $2, updated_at = NOW()
            WHERE oid = $1
            RETURNING id, oid, amount, currency, email, metadata, status AS "status: PaymentStatus", created_at, updated_at
            "#,
            oid,
            status as PaymentStatus,
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    fn attempt_request(oid: &str) -> PaymentAttemptCreateDBRequest {
        PaymentAttemptCreateDBRequest {
            oid: oid.to_string(),
            amount: Decimal::new(15000, 2),
            currency: "978".to_string(),
            email: "guest@example.com".to_string(),
            metadata: json!({"bookingId": "2b5f1f3a-6f7e-4a3c-9a1e-000000000000"}),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_by_oid(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = PaymentAttempts::new(&mut conn);

        let created = repo.create(&attempt_request("abc123def456abc123de")).await.unwrap();
        assert_eq!(created.status, PaymentStatus::Initiated);
        assert_eq!(created.currency, "978");

        let found = repo.get_by_oid("abc123def456abc123de").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.metadata["bookingId"], "2b5f1f3a-6f7e-4a3c-9a1e-000000000000");

        assert!(repo.get_by_oid("never-issued").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_oid_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = PaymentAttempts::new(&mut conn);

        repo.create(&attempt_request("abc123def456abc123de")).await.unwrap();
        let err = repo.create(&attempt_request("abc123def456abc123de")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_settle(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = PaymentAttempts::new(&mut conn);

        let created = repo.create(&attempt_request("abc123def456abc123de")).await.unwrap();

        let settled = repo.settle("abc123def456abc123de", PaymentStatus::Ok).await.unwrap().unwrap();
        assert_eq!(settled.status, PaymentStatus::Ok);
        assert!(settled.updated_at >= created.updated_at);

        // Unknown oids settle to nothing
        assert!(repo.settle("never-issued", PaymentStatus::Fail).await.unwrap().is_none());
    }
}
