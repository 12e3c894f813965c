//! Address resource handlers.
//!
//! The billing/shipping invariants are enforced by the repository's flag
//! sync; these handlers only validate fields and check ownership.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use goria_core::{AddressId, UserId};

use crate::db::addresses::{AddressChanges, AddressFilter, NewAddress};
use crate::db::{AddressRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAuth, ensure_owner_or_elevated};
use crate::models::{Address, User};
use crate::state::AppState;
use crate::validate::FieldRules;

/// Build the addresses router.
///
/// The `{id}` path parameter doubles as the owning user's ID for POST.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(read_all)).route(
        "/{id}",
        post(create).get(read).put(update).delete(remove),
    )
}

/// An address with its owner resolved.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    #[serde(flatten)]
    pub address: Address,
    pub user: User,
}

/// Resolve the owning user for a response.
async fn populate(state: &AppState, address: Address) -> Result<AddressResponse> {
    let user = UserRepository::new(state.pool())
        .get_by_id(address.user_id)
        .await?
        .ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "address {} references missing user {}",
                address.id, address.user_id
            ))
        })?;

    Ok(AddressResponse { address, user })
}

/// Create request body. `id`, `user_id`, and `twilio` are server-computed
/// and rejected by name when present.
#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub instructions: Option<String>,
    pub billing: Option<bool>,
    pub shipping: Option<bool>,
    pub id: Option<Value>,
    pub user_id: Option<Value>,
    pub twilio: Option<Value>,
}

/// Create an address for the user in the path. Owner or elevated only.
///
/// # Errors
///
/// Returns 400 with an itemized field list on validation failure, 404 if
/// the user doesn't exist.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>)> {
    let user_id = UserId::new(user_id);
    ensure_owner_or_elevated(&current, user_id)?;

    let mut rules = FieldRules::new();
    rules
        .require_str("name", body.name.as_deref())
        .require_str("address1", body.address1.as_deref())
        .require_str("zip", body.zip.as_deref())
        .require_str("city", body.city.as_deref())
        .require_str("state", body.state.as_deref())
        .require_str("country", body.country.as_deref())
        .require_str("phone", body.phone.as_deref())
        .forbid("id", body.id.as_ref())
        .forbid("user_id", body.user_id.as_ref())
        .forbid("twilio", body.twilio.as_ref());
    rules.finish()?;

    let address = AddressRepository::new(state.pool())
        .create(
            user_id,
            NewAddress {
                name: body.name.unwrap_or_default(),
                address1: body.address1.unwrap_or_default(),
                address2: body.address2,
                zip: body.zip.unwrap_or_default(),
                city: body.city.unwrap_or_default(),
                state: body.state.unwrap_or_default(),
                country: body.country.unwrap_or_default(),
                phone: body.phone.unwrap_or_default(),
                instructions: body.instructions,
                billing: body.billing,
                shipping: body.shipping,
            },
        )
        .await?;

    tracing::info!(address_id = %address.id, user_id = %user_id, "address created");

    let populated = populate(&state, address).await?;
    Ok((StatusCode::CREATED, Json(populated)))
}

/// Read one address with its owner populated.
///
/// # Errors
///
/// Returns 404 if the ID doesn't resolve, 401 on ownership failure.
pub async fn read(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AddressResponse>> {
    let address = AddressRepository::new(state.pool())
        .get(AddressId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_owner_or_elevated(&current, address.user_id)?;

    let populated = populate(&state, address).await?;
    Ok(Json(populated))
}

/// Equality filters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AddressListQuery {
    pub user_id: Option<i32>,
    pub billing: Option<bool>,
    pub shipping: Option<bool>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// List addresses. Non-elevated callers only ever see their own.
///
/// # Errors
///
/// Returns 400 if the store query fails.
pub async fn read_all(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<AddressListQuery>,
) -> Result<Json<Vec<Address>>> {
    let user_id = if current.is_elevated() {
        query.user_id.map(UserId::new)
    } else {
        Some(current.id)
    };

    let filter = AddressFilter {
        user_id,
        billing: query.billing,
        shipping: query.shipping,
        city: query.city,
        state: query.state,
        zip: query.zip,
        country: query.country,
    };

    let addresses = AddressRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(addresses))
}

/// Update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateAddressRequest {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub instructions: Option<String>,
    pub billing: Option<bool>,
    pub shipping: Option<bool>,
    pub id: Option<Value>,
    pub user_id: Option<Value>,
    pub twilio: Option<Value>,
}

/// Update an address; phone changes re-derive `twilio`, flag changes run
/// the sync rule. Owner or elevated only.
///
/// # Errors
///
/// Returns 400 on forbidden fields, 401 on ownership failure, 404 if the
/// address doesn't exist.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<Json<AddressResponse>> {
    let id = AddressId::new(id);
    let repository = AddressRepository::new(state.pool());

    let existing = repository.get(id).await?.ok_or(AppError::NotFound)?;
    ensure_owner_or_elevated(&current, existing.user_id)?;

    let mut rules = FieldRules::new();
    rules
        .forbid("id", body.id.as_ref())
        .forbid("user_id", body.user_id.as_ref())
        .forbid("twilio", body.twilio.as_ref());
    rules.finish()?;

    let address = repository
        .update(
            id,
            AddressChanges {
                name: body.name,
                address1: body.address1,
                address2: body.address2,
                zip: body.zip,
                city: body.city,
                state: body.state,
                country: body.country,
                phone: body.phone,
                instructions: body.instructions,
                billing: body.billing,
                shipping: body.shipping,
            },
        )
        .await?;

    let populated = populate(&state, address).await?;
    Ok(Json(populated))
}

/// Delete an address. Owner or elevated only.
///
/// # Errors
///
/// Returns 401 on ownership failure, 404 if the address doesn't exist.
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let id = AddressId::new(id);
    let repository = AddressRepository::new(state.pool());

    let existing = repository.get(id).await?.ok_or(AppError::NotFound)?;
    ensure_owner_or_elevated(&current, existing.user_id)?;

    repository.delete(id).await?;

    tracing::info!(address_id = %id, "address deleted");

    Ok(Json(json!({ "status": "ok" })))
}
