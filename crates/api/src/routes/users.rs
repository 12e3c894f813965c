//! User resource handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use goria_core::{Email, Role, UserId};

use crate::db::users::{UserChanges, UserFilter};
use crate::db::{AddressRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAuth, ensure_owner_or_elevated};
use crate::models::{Address, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;
use crate::validate::FieldRules;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(read_all))
        .route("/{id}", get(read).put(update).delete(remove))
}

/// A user with its pointer addresses resolved.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
}

/// Resolve the denormalized address pointers for a response.
async fn populate(state: &AppState, user: User) -> Result<UserResponse> {
    let addresses = AddressRepository::new(state.pool());

    let billing_address = match user.billing_address_id {
        Some(id) => addresses.get(id).await?,
        None => None,
    };
    let shipping_address = match user.shipping_address_id {
        Some(id) => addresses.get(id).await?,
        None => None,
    };

    Ok(UserResponse {
        user,
        billing_address,
        shipping_address,
    })
}

/// Signup request body. Server-computed fields are declared so their
/// presence can be rejected by name.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub id: Option<Value>,
    pub username: Option<Value>,
    pub role: Option<Value>,
    pub billing_address_id: Option<Value>,
    pub shipping_address_id: Option<Value>,
}

/// Open signup. Role is forced to `user`, username to the email.
///
/// # Errors
///
/// Returns 400 with an itemized field list on validation failure.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut rules = FieldRules::new();
    rules
        .require_str("first_name", body.first_name.as_deref())
        .require_str("last_name", body.last_name.as_deref())
        .require_str("email", body.email.as_deref())
        .require_str("password", body.password.as_deref())
        .forbid("id", body.id.as_ref())
        .forbid("username", body.username.as_ref())
        .forbid("role", body.role.as_ref())
        .forbid("billing_address_id", body.billing_address_id.as_ref())
        .forbid("shipping_address_id", body.shipping_address_id.as_ref());
    rules.finish()?;

    let user = AuthService::new(state.pool())
        .register(
            &body.first_name.unwrap_or_default(),
            &body.last_name.unwrap_or_default(),
            &body.email.unwrap_or_default(),
            &body.password.unwrap_or_default(),
        )
        .await?;

    tracing::info!(user_id = %user.id, "user created");

    let populated = populate(&state, user).await?;
    Ok((StatusCode::CREATED, Json(populated)))
}

/// Read one user with populated pointer addresses.
///
/// # Errors
///
/// Returns 404 if the ID doesn't resolve.
pub async fn read(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;

    let populated = populate(&state, user).await?;
    Ok(Json(populated))
}

/// Equality filters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// List users matching the query filters.
///
/// # Errors
///
/// Returns 400 if the store query fails.
pub async fn read_all(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<User>>> {
    let filter = UserFilter {
        username: query.username,
        email: query.email,
        role: query.role,
    };

    let users = UserRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(users))
}

/// Update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub id: Option<Value>,
    pub username: Option<Value>,
    pub role: Option<Value>,
    pub billing_address_id: Option<Value>,
    pub shipping_address_id: Option<Value>,
}

/// Update profile fields. Owner or elevated only.
///
/// # Errors
///
/// Returns 400 on forbidden fields, 401 on ownership failure, 404 if the
/// user doesn't exist.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let id = UserId::new(id);
    ensure_owner_or_elevated(&current, id)?;

    let mut rules = FieldRules::new();
    rules
        .forbid("id", body.id.as_ref())
        .forbid("username", body.username.as_ref())
        .forbid("role", body.role.as_ref())
        .forbid("billing_address_id", body.billing_address_id.as_ref())
        .forbid("shipping_address_id", body.shipping_address_id.as_ref());
    rules.finish()?;

    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;

    let user = UserRepository::new(state.pool())
        .update(
            id,
            UserChanges {
                first_name: body.first_name,
                last_name: body.last_name,
                email,
            },
        )
        .await?;

    let populated = populate(&state, user).await?;
    Ok(Json(populated))
}

/// Delete a user and every address they own. Owner or elevated only.
///
/// # Errors
///
/// Returns 401 on ownership failure, 404 if the user doesn't exist.
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let id = UserId::new(id);
    ensure_owner_or_elevated(&current, id)?;

    UserRepository::new(state.pool()).delete(id).await?;

    tracing::info!(user_id = %id, "user deleted");

    Ok(Json(json!({ "status": "ok" })))
}
