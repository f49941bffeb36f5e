//! Database repository for channel sync logs.

use crate::db::{
    errors::Result,
    models::sync_logs::{SyncLogCreateDBRequest, SyncLogDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing sync logs
#[derive(Debug, Clone)]
pub struct SyncLogFilter {
    pub villa_slug: Option<String>,
    pub limit: i64,
}

impl SyncLogFilter {
    pub fn new(limit: i64) -> Self {
        Self { villa_slug: None, limit }
    }

    pub fn with_villa_slug(mut self, slug: impl Into<String>) -> Self {
        self.villa_slug = Some(slug.into());
        self
    }
}

pub struct SyncLogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SyncLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(villa_slug = %request.villa_slug, source = %request.source), err)]
    pub async fn create(&mut self, request: &SyncLogCreateDBRequest) -> Result<SyncLogDBResponse> {
        let log = sqlx::query_as!(
            SyncLogDBResponse,
            r#"
            INSERT INTO sync_logs (id, villa_slug, check_in, check_out, available, source)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, villa_slug, check_in, check_out, available, source, synced_at
            "#,
            Uuid::new_v4(),
            request.villa_slug,
            request.check_in,
            request.check_out,
            request.available,
            request.source,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(log)
    }

    /// Most recent entries first, optionally narrowed to one villa.
    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    pub async fn list(&mut self, filter: &SyncLogFilter) -> Result<Vec<SyncLogDBResponse>> {
        let logs = sqlx::query_as!(
            SyncLogDBResponse,
            r#"
            SELECT id, villa_slug, check_in, check_out, available, source, synced_at
            FROM sync_logs
            WHERE $1::TEXT IS NULL OR villa_slug = $1
            ORDER BY synced_at DESC
            LIMIT $2
            "#,
            filter.villa_slug.as_deref(),
            filter.limit,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(logs)
    }
}
