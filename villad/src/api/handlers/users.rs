use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{
        SuccessResponse,
        users::{Role, UserCreate, UserResponse, UserStatsResponse, UserUpdate},
    },
    auth::{current_user::AdminUser, password},
    db::{
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::UserId,
};

/// List panel users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users, newest first", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, _: AdminUser) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let users = repo.list(&UserFilter::new(0, 1000)).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a panel user
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "admin",
    request_body = UserCreate,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Missing credentials or duplicate email"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    _: AdminUser,
    Json(request): Json<UserCreate>,
) -> Result<Json<UserResponse>, Error> {
    let (Some(email), Some(user_password)) = (request.email, request.password) else {
        return Err(Error::BadRequest {
            message: "Email and password required".to_string(),
        });
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    if repo.get_user_by_email(&email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "User with this email already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&user_password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let user = repo
        .create(&UserCreateDBRequest {
            email,
            password_hash,
            name: request.name.unwrap_or_default(),
            role: request.role.unwrap_or(Role::Staff),
        })
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a panel user
///
/// The password changes only when a non-blank one is supplied.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Would demote the last admin"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    _: AdminUser,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let target = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    if target.role == Role::Admin && request.role == Some(Role::Staff) && repo.count_admins().await? <= 1 {
        return Err(Error::BadRequest {
            message: "Cannot demote the last admin user".to_string(),
        });
    }

    let password_hash = match request.password.filter(|p| !p.trim().is_empty()) {
        Some(new_password) => Some(
            tokio::task::spawn_blocking(move || password::hash_string(&new_password))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??,
        ),
        None => None,
    };

    let user = repo
        .update(
            id,
            &UserUpdateDBRequest {
                email: request.email,
                name: request.name,
                role: request.role,
                password_hash,
            },
        )
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a panel user
///
/// The last remaining admin cannot be deleted.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 400, description = "Would remove the last admin"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    _: AdminUser,
) -> Result<Json<SuccessResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let target = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    if target.role == Role::Admin && repo.count_admins().await? <= 1 {
        return Err(Error::BadRequest {
            message: "Cannot delete the last admin user".to_string(),
        });
    }

    repo.delete(id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(SuccessResponse::new()))
}

/// User statistics for the dashboard
#[utoipa::path(
    get,
    path = "/api/admin/users/stats",
    tag = "admin",
    responses(
        (status = 200, description = "User counters", body = UserStatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn user_stats(State(state): State<AppState>, _: AdminUser) -> Result<Json<UserStatsResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let stats = repo.stats().await?;
    Ok(Json(UserStatsResponse {
        total: stats.total,
        admins: stats.admins,
        staff: stats.staff,
        recent: stats.recent,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::{UserResponse, UserStatsResponse};
    use crate::test_utils::*;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_requires_credentials(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/users")
            .add_header(name, value)
            .json(&json!({ "name": "No Credentials" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "Email and password required");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_rejects_duplicate_email(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/users")
            .add_header(name, value)
            .json(&json!({ "email": admin.email, "password": "some-password" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "User with this email already exists");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_created_user_defaults_to_staff(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "email": "staff@example.com", "password": "staff-password" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["role"], "staff");
        assert_eq!(body["name"], "");
        // The hash never leaves the database layer
        assert!(body.get("passwordHash").is_none());
        assert!(body.get("password_hash").is_none());

        let response = app.get("/api/admin/users").add_header(name, value).await;
        let users: Vec<UserResponse> = response.json();
        assert_eq!(users.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_last_admin_cannot_be_deleted(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .delete(&format!("/api/admin/users/{}", admin.id))
            .add_header(name.clone(), value.clone())
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "Cannot delete the last admin user");

        // A staff account can still be removed
        let staff = create_test_user(&pool).await;
        let response = app
            .delete(&format!("/api/admin/users/{}", staff.id))
            .add_header(name, value)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["success"], true);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_second_admin_can_be_deleted(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .post("/api/admin/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "email": "second@example.com", "password": "second-password", "role": "admin" }))
            .await;
        let second: serde_json::Value = response.json();

        let response = app
            .delete(&format!("/api/admin/users/{}", second["id"].as_str().unwrap()))
            .add_header(name, value)
            .await;

        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_last_admin_cannot_be_demoted(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .put(&format!("/api/admin/users/{}", admin.id))
            .add_header(name, value)
            .json(&json!({ "role": "staff" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "Cannot demote the last admin user");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_blank_password_keeps_the_old_one(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app
            .put(&format!("/api/admin/users/{}", admin.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "name": "Renamed Admin", "password": "  " }))
            .await;
        response.assert_status_ok();

        // Old password still logs in
        let response = app
            .post("/api/admin/login")
            .json(&json!({ "email": admin.email, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();

        // A real password change takes effect
        let response = app
            .put(&format!("/api/admin/users/{}", admin.id))
            .add_header(name, value)
            .json(&json!({ "password": "brand-new-password" }))
            .await;
        response.assert_status_ok();

        let response = app
            .post("/api/admin/login")
            .json(&json!({ "email": admin.email, "password": "brand-new-password" }))
            .await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_stats(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        let admin = create_test_admin_user(&pool).await;
        let _staff = create_test_user(&pool).await;
        let (name, value) = auth_header(&admin, &state.config);

        let response = app.get("/api/admin/users/stats").add_header(name, value).await;

        response.assert_status_ok();
        let stats: UserStatsResponse = response.json();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.staff, 1);
        assert_eq!(stats.recent, 2);
    }
}
