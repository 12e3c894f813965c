//! Login and logout handlers.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Verify credentials and store the caller in the session.
///
/// # Errors
///
/// Returns 401 for a bad username/password combination.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.username, &body.password)
        .await?;

    set_current_user(
        &session,
        &CurrentUser {
            id: user.id,
            role: user.role,
        },
    )
    .await
    .map_err(AuthError::from)?;

    tracing::info!(user_id = %user.id, "login");

    Ok(Json(user))
}

/// Drop the caller from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await.map_err(AuthError::from)?;
    Ok(Json(json!({ "status": "ok" })))
}
