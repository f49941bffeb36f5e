use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{
        SuccessResponse,
        villas::{VillaCreate, VillaResponse, VillaUpdate},
    },
    auth::current_user::AdminUser,
    db::{
        handlers::{Repository, Villas, villas::VillaFilter},
        models::villas::{VillaCreateDBRequest, VillaUpdateDBRequest},
    },
    errors::Error,
    types::VillaId,
};

/// List the villa catalog
#[utoipa::path(
    get,
    path = "/api/villas",
    tag = "villas",
    responses(
        (status = 200, description = "All villas", body = [VillaResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_villas(State(state): State<AppState>) -> Result<Json<Vec<VillaResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Villas::new(&mut conn);

    let villas = repo.list(&VillaFilter::default()).await?;
    Ok(Json(villas.into_iter().map(VillaResponse::from).collect()))
}

/// List villas for the admin panel
#[utoipa::path(
    get,
    path = "/api/admin/villas",
    tag = "admin",
    responses(
        (status = 200, description = "All villas", body = [VillaResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn admin_list_villas(State(state): State<AppState>, _: AdminUser) -> Result<Json<Vec<VillaResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Villas::new(&mut conn);

    let villas = repo.list(&VillaFilter::default()).await?;
    Ok(Json(villas.into_iter().map(VillaResponse::from).collect()))
}

/// Create a villa
#[utoipa::path(
    post,
    path = "/api/admin/villas",
    tag = "admin",
    request_body = VillaCreate,
    responses(
        (status = 200, description = "Villa created", body = VillaResponse),
        (status = 400, description = "Duplicate slug"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_villa(
    State(state): State<AppState>,
    _: AdminUser,
    Json(request): Json<VillaCreate>,
) -> Result<Json<VillaResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Villas::new(&mut conn);

    let villa = repo.create(&VillaCreateDBRequest::from(request)).await?;
    Ok(Json(VillaResponse::from(villa)))
}

/// Update a villa
#[utoipa::path(
    put,
    path = "/api/admin/villas/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Villa ID")),
    request_body = VillaUpdate,
    responses(
        (status = 200, description = "Villa updated", body = VillaResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Villa not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_villa(
    State(state): State<AppState>,
    Path(id): Path<VillaId>,
    _: AdminUser,
    Json(request): Json<VillaUpdate>,
) -> Result<Json<VillaResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Villas::new(&mut conn);

    let villa = repo.update(id, &VillaUpdateDBRequest::from(request)).await?;
    Ok(Json(VillaResponse::from(villa)))
}

/// Delete a villa
#[utoipa::path(
    delete,
    path = "/api/admin/villas/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Villa ID")),
    responses(
        (status = 200, description = "Villa deleted", body = SuccessResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Villa not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_villa(
    State(state): State<AppState>,
    Path(id): Path<VillaId>,
    _: AdminUser,
) -> Result<Json<SuccessResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Villas::new(&mut conn);

    match repo.delete(id).await? {
        true => Ok(Json(SuccessResponse::new())),
        false => Err(Error::NotFound {
            resource: "Villa".to_string(),
            id: id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::villas::VillaResponse;
    use crate::test_utils::*;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_villa_list(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone()).await;
        seed_test_villa(&pool, "vip-1", "VIP 1", "VIP").await;
        seed_test_villa(&pool, "premium-1", "Premium 1", "Premium").await;

        let response = app.get("/api/villas").await;

        response.assert_status_ok();
        let villas: Vec<VillaResponse> = response.json();
        assert_eq!(villas.len(), 2);
        assert_eq!(villas[0].slug, "vip-1");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_villa_list_requires_token(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone()).await;

        let response = app.get("/api/admin/villas").await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<serde_json::Value>()["error"], "Missing token");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_update_villa(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/villas")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "slug": "vip-4",
                "name": "VIP 4",
                "category": "VIP",
                "price": "250.00"
            }))
            .await;

        response.assert_status_ok();
        let villa: VillaResponse = response.json();
        assert_eq!(villa.slug, "vip-4");

        let response = app
            .put(&format!("/api/admin/villas/{}", villa.id))
            .add_header(name, value)
            .json(&json!({ "name": "VIP 4 Deluxe" }))
            .await;

        response.assert_status_ok();
        let updated: VillaResponse = response.json();
        assert_eq!(updated.name, "VIP 4 Deluxe");
        assert_eq!(updated.slug, "vip-4");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_slug_rejected(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        seed_test_villa(&pool, "vip-1", "VIP 1", "VIP").await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/villas")
            .add_header(name, value)
            .json(&json!({
                "slug": "vip-1",
                "name": "Another",
                "category": "VIP",
                "price": "100.00"
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_villa(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let villa = seed_test_villa(&pool, "vip-1", "VIP 1", "VIP").await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .delete(&format!("/api/admin/villas/{}", villa.id))
            .add_header(name.clone(), value.clone())
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["success"], true);

        let response = app.delete(&format!("/api/admin/villas/{}", villa.id)).add_header(name, value).await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_staff_token_is_forbidden(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let staff = create_test_user(&pool).await;
        let (name, value) = auth_header(&staff, &state.config);

        let response = app.get("/api/admin/villas").add_header(name, value).await;

        response.assert_status_forbidden();
        assert_eq!(response.json::<serde_json::Value>()["error"], "Forbidden");
    }
}
