//! Settings resource handlers. Every operation needs the elevated role.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use goria_core::SettingId;

use crate::db::SettingRepository;
use crate::db::settings::{NewSetting, SettingChanges};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAuth, ensure_elevated};
use crate::models::Setting;
use crate::state::AppState;
use crate::validate::FieldRules;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(read_all))
        .route("/{id}", get(read).put(update).delete(remove))
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateSettingRequest {
    pub name: Option<String>,
    pub incoming_order_alert_email: Option<String>,
    pub incoming_return_alert_email: Option<String>,
    pub incoming_review_alert_email: Option<String>,
    pub default_shipping_cost: Option<Decimal>,
    pub id: Option<Value>,
}

/// Update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub name: Option<String>,
    pub incoming_order_alert_email: Option<String>,
    pub incoming_return_alert_email: Option<String>,
    pub incoming_review_alert_email: Option<String>,
    pub default_shipping_cost: Option<Decimal>,
    pub id: Option<Value>,
}

/// Create a setting.
///
/// # Errors
///
/// Returns 400 with an itemized field list on validation failure.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateSettingRequest>,
) -> Result<(StatusCode, Json<Setting>)> {
    ensure_elevated(&current)?;

    let mut rules = FieldRules::new();
    rules
        .require_str("name", body.name.as_deref())
        .forbid("id", body.id.as_ref());
    rules.finish()?;

    let setting = SettingRepository::new(state.pool())
        .create(NewSetting {
            name: body.name.unwrap_or_default(),
            incoming_order_alert_email: body.incoming_order_alert_email,
            incoming_return_alert_email: body.incoming_return_alert_email,
            incoming_review_alert_email: body.incoming_review_alert_email,
            default_shipping_cost: body.default_shipping_cost,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(setting)))
}

/// Read one setting.
///
/// # Errors
///
/// Returns 404 if the ID doesn't resolve.
pub async fn read(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Setting>> {
    ensure_elevated(&current)?;

    let setting = SettingRepository::new(state.pool())
        .get(SettingId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(setting))
}

/// List every setting.
///
/// # Errors
///
/// Returns 400 if the store query fails.
pub async fn read_all(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Setting>>> {
    ensure_elevated(&current)?;

    let settings = SettingRepository::new(state.pool()).list().await?;
    Ok(Json(settings))
}

/// Update a setting.
///
/// # Errors
///
/// Returns 400 on forbidden fields, 404 if the setting doesn't exist.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateSettingRequest>,
) -> Result<Json<Setting>> {
    ensure_elevated(&current)?;

    let mut rules = FieldRules::new();
    rules.forbid("id", body.id.as_ref());
    rules.finish()?;

    let setting = SettingRepository::new(state.pool())
        .update(
            SettingId::new(id),
            SettingChanges {
                name: body.name,
                incoming_order_alert_email: body.incoming_order_alert_email,
                incoming_return_alert_email: body.incoming_return_alert_email,
                incoming_review_alert_email: body.incoming_review_alert_email,
                default_shipping_cost: body.default_shipping_cost,
            },
        )
        .await?;

    Ok(Json(setting))
}

/// Delete a setting.
///
/// # Errors
///
/// Returns 404 if the setting doesn't exist.
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    ensure_elevated(&current)?;

    SettingRepository::new(state.pool())
        .delete(SettingId::new(id))
        .await?;

    Ok(Json(json!({ "status": "ok" })))
}
