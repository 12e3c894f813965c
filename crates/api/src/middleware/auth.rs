//! Authentication extractors and the capability-check helpers.
//!
//! Every handler that needs a caller takes [`RequireAuth`]; the two
//! `ensure_*` functions are the single place role/ownership rules live,
//! so individual handlers never hand-roll them.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use goria_core::UserId;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires an authenticated caller.
///
/// Rejects with `401 {"error":"unauthorized"}` when no session user exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(current): RequireAuth) -> impl IntoResponse {
///     format!("caller {}", current.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session is placed in extensions by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let current: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(current))
    }
}

/// Require the elevated role.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the caller is not elevated.
pub const fn ensure_elevated(current: &CurrentUser) -> Result<(), AppError> {
    if current.is_elevated() {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Require that the caller owns the resource, or holds the elevated role.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if neither holds.
pub fn ensure_owner_or_elevated(current: &CurrentUser, owner: UserId) -> Result<(), AppError> {
    if current.is_elevated() || current.id == owner {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Store the authenticated caller in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    current: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, current).await
}

/// Clear the authenticated caller from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use goria_core::Role;

    const fn caller(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            role,
        }
    }

    #[test]
    fn test_ensure_elevated() {
        assert!(ensure_elevated(&caller(1, Role::Admin)).is_ok());
        assert!(ensure_elevated(&caller(1, Role::User)).is_err());
    }

    #[test]
    fn test_ensure_owner_or_elevated() {
        // owner passes regardless of role
        assert!(ensure_owner_or_elevated(&caller(1, Role::User), UserId::new(1)).is_ok());
        // elevated passes on anyone's resource
        assert!(ensure_owner_or_elevated(&caller(2, Role::Admin), UserId::new(1)).is_ok());
        // plain user on someone else's resource fails
        assert!(ensure_owner_or_elevated(&caller(2, Role::User), UserId::new(1)).is_err());
    }
}
