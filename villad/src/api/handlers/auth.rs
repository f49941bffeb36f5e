use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, LoginResponse},
        users::{CurrentUser, Role},
    },
    auth::{password, session},
    db::handlers::Users,
    errors::Error,
};

/// Sign in to the admin panel
///
/// Only accounts holding the admin role are issued tokens. Staff accounts
/// and wrong passwords get the same answer, so the response does not reveal
/// which part of the credentials was wrong.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or not admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid credentials or not admin".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid || user.role != Role::Admin {
        return Err(Error::Unauthenticated {
            message: Some("Invalid credentials or not admin".to_string()),
        });
    }

    let current_user = CurrentUser::from(user);
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: current_user.into(),
    }))
}
