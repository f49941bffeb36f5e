//! Database repository for villas.

use crate::types::{VillaId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::villas::{VillaCreateDBRequest, VillaDBResponse, VillaUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing villas
#[derive(Debug, Clone, Default)]
pub struct VillaFilter {
    /// Case-insensitive category match; `None` matches everything
    pub category: Option<String>,
}

impl VillaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

pub struct Villas<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Villas<'c> {
    type CreateRequest = VillaCreateDBRequest;
    type UpdateRequest = VillaUpdateDBRequest;
    type Response = VillaDBResponse;
    type Id = VillaId;
    type Filter = VillaFilter;

    #[instrument(skip(self, request), fields(slug = %request.slug), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let villa_id = Uuid::new_v4();

        let villa = sqlx::query_as!(
            VillaDBResponse,
            r#"
            INSERT INTO villas (id, slug, name, category, price, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, slug, name, category, price, description, created_at
            "#,
            villa_id,
            request.slug,
            request.name,
            request.category,
            request.price,
            request.description.as_deref(),
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(villa)
    }

    #[instrument(skip(self), fields(villa_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let villa = sqlx::query_as!(
            VillaDBResponse,
            "SELECT id, slug, name, category, price, description, created_at FROM villas WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(villa)
    }

    /// List villas in catalog (insertion) order, optionally narrowed by category.
    #[instrument(skip(self, filter), fields(category = filter.category.as_deref().unwrap_or("-")), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let villas = sqlx::query_as!(
            VillaDBResponse,
            r#"
            SELECT id, slug, name, category, price, description, created_at
            FROM villas
            WHERE $1::TEXT IS NULL OR LOWER(category) = LOWER($1)
            ORDER BY created_at ASC
            "#,
            filter.category.as_deref(),
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(villas)
    }

    #[instrument(skip(self), fields(villa_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM villas WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(villa_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let villa = sqlx::query_as!(
            VillaDBResponse,
            r#"
            UPDATE villas SET
                slug = COALESCE($2, slug),
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                price = COALESCE($5, price),
                description = COALESCE($6, description)
            WHERE id = $1
            RETURNING id, slug, name, category, price, description, created_at
            "#,
            id,
            request.slug.as_deref(),
            request.name.as_deref(),
            request.category.as_deref(),
            request.price,
            request.description.as_deref(),
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(villa)
    }
}

impl<'c> Villas<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, slug), err)]
    pub async fn get_by_slug(&mut self, slug: &str) -> Result<Option<VillaDBResponse>> {
        let villa = sqlx::query_as!(
            VillaDBResponse,
            "SELECT id, slug, name, category, price, description, created_at FROM villas WHERE slug = $1",
            slug
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(villa)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use rust_decimal::Decimal;

    use sqlx::PgPool;

    fn villa_request(slug: &str, category: &str) -> VillaCreateDBRequest {
        VillaCreateDBRequest {
            slug: slug.to_string(),
            name: format!("Villa {slug}"),
            category: category.to_string(),
            price: Decimal::new(15000, 2),
            description: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_by_slug(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Villas::new(&mut conn);

        let created = repo.create(&villa_request("premium-1", "premium")).await.unwrap();
        assert_eq!(created.slug, "premium-1");
        assert_eq!(created.price, Decimal::new(15000, 2));

        let found = repo.get_by_slug("premium-1").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_slug_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Villas::new(&mut conn);

        repo.create(&villa_request("premium-1", "premium")).await.unwrap();
        let err = repo.create(&villa_request("premium-1", "standard")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_category_filter_is_case_insensitive(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Villas::new(&mut conn);

        repo.create(&villa_request("premium-1", "Premium")).await.unwrap();
        repo.create(&villa_request("standard-1", "standard")).await.unwrap();
        repo.create(&villa_request("premium-2", "premium")).await.unwrap();

        let all = repo.list(&VillaFilter::new()).await.unwrap();
        assert_eq!(all.len(), 3);

        let premium = repo.list(&VillaFilter::new().with_category("PREMIUM")).await.unwrap();
        assert_eq!(premium.len(), 2);
        assert!(premium.iter().all(|v| v.category.eq_ignore_ascii_case("premium")));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_keeps_unset_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Villas::new(&mut conn);

        let created = repo.create(&villa_request("premium-1", "premium")).await.unwrap();

        let update = VillaUpdateDBRequest {
            slug: None,
            name: Some("Seafront Retreat".to_string()),
            category: None,
            price: Some(Decimal::new(21000, 2)),
            description: None,
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.name, "Seafront Retreat");
        assert_eq!(updated.price, Decimal::new(21000, 2));
        assert_eq!(updated.slug, "premium-1");
        assert_eq!(updated.category, "premium");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Villas::new(&mut conn);

        let created = repo.create(&villa_request("premium-1", "premium")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
