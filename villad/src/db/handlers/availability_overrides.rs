//! Database repository for per-day availability overrides.
//!
//! Channel sync expands a date range into one row per calendar day, so
//! blocking is an upsert loop and unblocking is a range delete. The range is
//! half-open: the checkout day itself stays bookable.

use crate::db::{
    errors::Result,
    models::availability_overrides::{AvailabilityOverrideDBResponse, BlockedRangeDBResponse},
};
use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct AvailabilityOverrides<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AvailabilityOverrides<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Mark every day in `[start, end)` unavailable, tagged with `source`.
    ///
    /// Returns the number of days written.
    #[instrument(skip(self), fields(villa_slug = %villa_slug, source = %source), err)]
    pub async fn block_range(&mut self, villa_slug: &str, start: NaiveDate, end: NaiveDate, source: &str) -> Result<u64> {
        let mut days = 0;
        for day in start.iter_days().take_while(|d| *d < end) {
            sqlx::query!(
                r#"
                INSERT INTO availability_overrides (id, villa_slug, date, available, source)
                VALUES ($1, $2, $3, FALSE, $4)
                ON CONFLICT (villa_slug, date)
                DO UPDATE SET available = FALSE, source = EXCLUDED.source, updated_at = NOW()
                "#,
                Uuid::new_v4(),
                villa_slug,
                day,
                source,
            )
            .execute(&mut *self.db)
            .await?;
            days += 1;
        }

        Ok(days)
    }

    /// Drop every override in `[start, end)`, reopening those days.
    ///
    /// Returns the number of rows removed.
    #[instrument(skip(self), fields(villa_slug = %villa_slug), err)]
    pub async fn unblock_range(&mut self, villa_slug: &str, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let result = sqlx::query!(
            "DELETE FROM availability_overrides WHERE villa_slug = $1 AND date >= $2 AND date < $3",
            villa_slug,
            start,
            end,
        )
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Summarize blocks inside `[start, end)`: how many days, and which
    /// sources put them there (distinct, earliest day first).
    #[instrument(skip(self), fields(villa_slug = %villa_slug), err)]
    pub async fn blocked_in_range(&mut self, villa_slug: &str, start: NaiveDate, end: NaiveDate) -> Result<BlockedRangeDBResponse> {
        let rows = sqlx::query!(
            r#"
            SELECT source FROM availability_overrides
            WHERE villa_slug = $1 AND date >= $2 AND date < $3 AND available = FALSE
            ORDER BY date ASC
            "#,
            villa_slug,
            start,
            end,
        )
        .fetch_all(&mut *self.db)
        .await?;

        let blocked_dates = rows.len() as i64;
        let mut sources: Vec<String> = Vec::new();
        for row in rows {
            if !sources.contains(&row.source) {
                sources.push(row.source);
            }
        }

        Ok(BlockedRangeDBResponse { blocked_dates, sources })
    }

    /// All override rows for one villa, oldest day first.
    #[instrument(skip(self), fields(villa_slug = %villa_slug), err)]
    pub async fn list_for_villa(&mut self, villa_slug: &str) -> Result<Vec<AvailabilityOverrideDBResponse>> {
        let rows = sqlx::query_as!(
            AvailabilityOverrideDBResponse,
            r#"
            SELECT id, villa_slug, date, available, source, updated_at
            FROM availability_overrides
            WHERE villa_slug = $1
            ORDER BY date ASC
            "#,
            villa_slug,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
