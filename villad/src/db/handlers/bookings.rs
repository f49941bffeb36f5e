//! Database repository for bookings.
//!
//! Besides plain CRUD this module owns the overlap counting used by every
//! availability decision. Two bookings conflict when their half-open date
//! ranges intersect; back-to-back stays (one ends the day the other starts)
//! do not conflict. Only confirmed and pending bookings count.

use crate::api::models::bookings::BookingStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::bookings::{
        BookingCreateDBRequest, BookingDBResponse, BookingStatsDBResponse, BookingUpdateDBRequest,
        BookingWithVillaDBResponse,
    },
};
use crate::types::{BookingId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, query_builder::QueryBuilder};
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing bookings
#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub villa_slug: Option<String>,
    pub status: Option<BookingStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl BookingFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            villa_slug: None,
            status: None,
            skip,
            limit,
        }
    }

    pub fn with_villa_slug(mut self, slug: impl Into<String>) -> Self {
        self.villa_slug = Some(slug.into());
        self
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Booking {
    pub id: BookingId,
    pub villa_slug: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingDBResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            villa_slug: b.villa_slug,
            name: b.name,
            email: b.email,
            phone: b.phone,
            check_in: b.check_in,
            check_out: b.check_out,
            guests: b.guests,
            amount: b.amount,
            status: b.status,
            source: b.source,
            created_at: b.created_at,
        }
    }
}

pub struct Bookings<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Bookings<'c> {
    type CreateRequest = BookingCreateDBRequest;
    type UpdateRequest = BookingUpdateDBRequest;
    type Response = BookingDBResponse;
    type Id = BookingId;
    type Filter = BookingFilter;

    #[instrument(skip(self, request), fields(villa_slug = %request.villa_slug, email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let booking_id = Uuid::new_v4();

        let booking = sqlx::query_as!(
            Booking,
            r#"
            INSERT INTO bookings (id, villa_slug, name, email, phone, check_in, check_out, guests, amount, status, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, villa_slug, name, email, phone, check_in, check_out, guests, amount,
                      status AS "status: BookingStatus", source, created_at
            "#,
            booking_id,
            request.villa_slug,
            request.name,
            request.email,
            request.phone.as_deref(),
            request.check_in,
            request.check_out,
            request.guests,
            request.amount,
            request.status as BookingStatus,
            request.source,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(booking.into())
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let booking = sqlx::query_as!(
            Booking,
            r#"
            SELECT id, villa_slug, name, email, phone, check_in, check_out, guests, amount,
                   status AS "status: BookingStatus", source, created_at
            FROM bookings WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(booking.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(
            "SELECT id, villa_slug, name, email, phone, check_in, check_out, guests, amount, status, source, created_at FROM bookings WHERE 1=1",
        );

        // Add villa filter if specified
        if let Some(ref villa_slug) = filter.villa_slug {
            query.push(" AND villa_slug = ");
            query.push_bind(villa_slug);
        }

        // Add status filter if specified
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }

        // Add ordering and pagination
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let bookings = query.build_query_as::<Booking>().fetch_all(&mut *self.db).await?;

        Ok(bookings.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM bookings WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(booking_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let booking = sqlx::query_as!(
            Booking,
            r#"
            UPDATE bookings SET
                villa_slug = COALESCE($2, villa_slug),
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                check_in = COALESCE($6, check_in),
                check_out = COALESCE($7, check_out),
                guests = COALESCE($8, guests),
                amount = COALESCE($9, amount),
                status = COALESCE($10, status),
                source = COALESCE($11, source)
            WHERE id = $1
            RETURNING id, villa_slug, name, email, phone, check_in, check_out, guests, amount,
                      status AS "status: BookingStatus", source, created_at
            "#,
            id,
            request.villa_slug.as_deref(),
            request.name.as_deref(),
            request.email.as_deref(),
            request.phone.as_deref(),
            request.check_in,
            request.check_out,
            request.guests,
            request.amount,
            request.status as Option<BookingStatus>,
            request.source.as_deref(),
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(booking.into())
    }
}

impl<'c> Bookings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List bookings newest-first with their villa summary joined in.
    #[instrument(skip(self), err)]
    pub async fn list_with_villas(&mut self) -> Result<Vec<BookingWithVillaDBResponse>> {
        let rows = sqlx::query!(
            r#"
            SELECT b.id, b.villa_slug, b.name, b.email, b.phone, b.check_in, b.check_out,
                   b.guests, b.amount, b.status AS "status: BookingStatus", b.source, b.created_at,
                   v.id AS villa_id, v.name AS villa_name, v.category AS villa_category
            FROM bookings b
            JOIN villas v ON v.slug = b.villa_slug
            ORDER BY b.created_at DESC
            "#
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BookingWithVillaDBResponse {
                booking: BookingDBResponse {
                    id: row.id,
                    villa_slug: row.villa_slug,
                    name: row.name,
                    email: row.email,
                    phone: row.phone,
                    check_in: row.check_in,
                    check_out: row.check_out,
                    guests: row.guests,
                    amount: row.amount,
                    status: row.status,
                    source: row.source,
                    created_at: row.created_at,
                },
                villa_id: row.villa_id,
                villa_name: row.villa_name,
                villa_category: row.villa_category,
            })
            .collect())
    }

    /// Count confirmed or pending bookings whose stay intersects the range.
    ///
    /// A booking conflicts when it covers the requested check-in, covers the
    /// requested check-out, sits inside the range, or swallows it whole.
    /// Shared boundary days are not conflicts.
    #[instrument(skip(self), fields(villa_slug = %villa_slug), err)]
    pub async fn count_overlapping(
        &mut self,
        villa_slug: &str,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM bookings
            WHERE villa_slug = $1
              AND status IN ('confirmed', 'pending')
              AND (
                    (check_in <= $2 AND check_out > $2)
                 OR (check_in < $3 AND check_out >= $3)
                 OR (check_in >= $2 AND check_out <= $3)
                 OR (check_in <= $2 AND check_out >= $3)
              )
            "#,
            villa_slug,
            check_in,
            check_out,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn stats(&mut self) -> Result<BookingStatsDBResponse> {
        let row = sqlx::query!(
            r#"
            SELECT
                COUNT(*) AS "total!",
                COUNT(*) FILTER (WHERE created_at >= date_trunc('month', NOW())) AS "monthly!",
                COUNT(*) FILTER (WHERE created_at >= date_trunc('year', NOW())) AS "yearly!",
                COUNT(*) FILTER (WHERE status = 'pending') AS "pending!",
                COUNT(*) FILTER (WHERE status = 'paid') AS "paid!"
            FROM bookings
            "#
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(BookingStatsDBResponse {
            total: row.total,
            monthly: row.monthly,
            yearly: row.yearly,
            pending: row.pending,
            paid: row.paid,
        })
    }

    /// Set the status of every booking in `ids`, returning how many changed.
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_update_status(&mut self, ids: &[BookingId], status: BookingStatus) -> Result<u64> {
        let result = sqlx::query!(
            "UPDATE bookings SET status = $2 WHERE id = ANY($1)",
            ids,
            status as BookingStatus,
        )
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every booking in `ids`, returning how many went away.
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[BookingId]) -> Result<u64> {
        let result = sqlx::query!("DELETE FROM bookings WHERE id = ANY($1)", ids)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::handlers::villas::Villas;
    use crate::db::models::villas::VillaCreateDBRequest;
    use chrono::TimeZone;
    use sqlx::PgPool;

    fn nov(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0).unwrap()
    }

    async fn seed_villa(conn: &mut PgConnection, slug: &str) {
        let mut villas = Villas::new(conn);
        villas
            .create(&VillaCreateDBRequest {
                slug: slug.to_string(),
                name: format!("Villa {slug}"),
                category: "premium".to_string(),
                price: Decimal::new(15000, 2),
                description: None,
            })
            .await
            .unwrap();
    }

    fn booking_request(slug: &str, check_in: DateTime<Utc>, check_out: DateTime<Utc>, status: BookingStatus) -> BookingCreateDBRequest {
        BookingCreateDBRequest {
            villa_slug: slug.to_string(),
            name: "Guest".to_string(),
            email: "guest@example.com".to_string(),
            phone: None,
            check_in,
            check_out,
            guests: 2,
            amount: Decimal::new(45000, 2),
            status,
            source: "website".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_booking(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        let booking = repo
            .create(&booking_request("premium-1", nov(1), nov(5), BookingStatus::Pending))
            .await
            .unwrap();

        assert_eq!(booking.villa_slug, "premium-1");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.source, "website");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_villa_is_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Bookings::new(&mut conn);

        let err = repo
            .create(&booking_request("missing", nov(1), nov(5), BookingStatus::Pending))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inverted_range_is_check_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        let err = repo
            .create(&booking_request("premium-1", nov(5), nov(5), BookingStatus::Pending))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_overlap_matrix(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;
        seed_villa(&mut conn, "premium-2").await;

        let mut repo = Bookings::new(&mut conn);
        // Existing stay: Nov 1 to Nov 5
        repo.create(&booking_request("premium-1", nov(1), nov(5), BookingStatus::Confirmed))
            .await
            .unwrap();

        // Contained inside the stay
        assert_eq!(repo.count_overlapping("premium-1", nov(3), nov(4)).await.unwrap(), 1);
        // Straddles the start
        assert_eq!(
            repo.count_overlapping("premium-1", Utc.with_ymd_and_hms(2025, 10, 30, 0, 0, 0).unwrap(), nov(2))
                .await
                .unwrap(),
            1
        );
        // Straddles the end
        assert_eq!(repo.count_overlapping("premium-1", nov(4), nov(8)).await.unwrap(), 1);
        // Swallows the stay whole
        assert_eq!(
            repo.count_overlapping(
                "premium-1",
                Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()
            )
            .await
            .unwrap(),
            1
        );
        // Back-to-back after checkout is fine
        assert_eq!(repo.count_overlapping("premium-1", nov(5), nov(8)).await.unwrap(), 0);
        // Back-to-back before checkin is fine
        assert_eq!(
            repo.count_overlapping("premium-1", Utc.with_ymd_and_hms(2025, 10, 28, 0, 0, 0).unwrap(), nov(1))
                .await
                .unwrap(),
            0
        );
        // Other villas are unaffected
        assert_eq!(repo.count_overlapping("premium-2", nov(3), nov(4)).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancelled_bookings_do_not_conflict(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        repo.create(&booking_request("premium-1", nov(1), nov(5), BookingStatus::Cancelled))
            .await
            .unwrap();

        assert_eq!(repo.count_overlapping("premium-1", nov(2), nov(4)).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_and_limit(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;
        seed_villa(&mut conn, "premium-2").await;

        let mut repo = Bookings::new(&mut conn);
        repo.create(&booking_request("premium-1", nov(1), nov(5), BookingStatus::Pending))
            .await
            .unwrap();
        repo.create(&booking_request("premium-2", nov(10), nov(12), BookingStatus::Confirmed))
            .await
            .unwrap();
        repo.create(&booking_request("premium-1", nov(20), nov(25), BookingStatus::Paid))
            .await
            .unwrap();

        let all = repo.list(&BookingFilter::new(0, 100)).await.unwrap();
        assert_eq!(all.len(), 3);

        let premium_1 = repo.list(&BookingFilter::new(0, 100).with_villa_slug("premium-1")).await.unwrap();
        assert_eq!(premium_1.len(), 2);

        let paid = repo.list(&BookingFilter::new(0, 100).with_status(BookingStatus::Paid)).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].villa_slug, "premium-1");

        let capped = repo.list(&BookingFilter::new(0, 2)).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_with_villas_embeds_summary(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        repo.create(&booking_request("premium-1", nov(1), nov(5), BookingStatus::Pending))
            .await
            .unwrap();

        let rows = repo.list_with_villas().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].villa_name, "Villa premium-1");
        assert_eq!(rows[0].villa_category, "premium");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_status_and_delete(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        let a = repo
            .create(&booking_request("premium-1", nov(1), nov(3), BookingStatus::Pending))
            .await
            .unwrap();
        let b = repo
            .create(&booking_request("premium-1", nov(10), nov(12), BookingStatus::Pending))
            .await
            .unwrap();

        let updated = repo.bulk_update_status(&[a.id, b.id], BookingStatus::Confirmed).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(repo.get_by_id(a.id).await.unwrap().unwrap().status, BookingStatus::Confirmed);

        let deleted = repo.bulk_delete(&[a.id, b.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(repo.get_by_id(b.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_stats(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_villa(&mut conn, "premium-1").await;

        let mut repo = Bookings::new(&mut conn);
        repo.create(&booking_request("premium-1", nov(1), nov(3), BookingStatus::Pending))
            .await
            .unwrap();
        repo.create(&booking_request("premium-1", nov(10), nov(12), BookingStatus::Paid))
            .await
            .unwrap();
        repo.create(&booking_request("premium-1", nov(20), nov(22), BookingStatus::Cancelled))
            .await
            .unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        // All rows were created just now, inside the current month and year
        assert_eq!(stats.monthly, 3);
        assert_eq!(stats.yearly, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.paid, 1);
    }
}
