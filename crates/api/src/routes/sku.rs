//! SKU taxonomy resource handlers.
//!
//! Group, Line, and Type share one handler shape, generated per entity so
//! each keeps its typed ID and repository. Size gets hand-written handlers
//! for its extra type reference. Reads need a session; writes need the
//! elevated role.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use goria_core::{GroupId, LineId, SizeId, TypeId};

use crate::db::sku::{NewSize, NewTaxonomyEntry, SizeChanges, TaxonomyChanges};
use crate::db::{GroupRepository, LineRepository, SizeRepository, TypeRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAuth, ensure_elevated};
use crate::models::{Group, Line, Size, SkuType};
use crate::state::AppState;
use crate::validate::FieldRules;

/// Create the taxonomy routes, one sub-tree per entity.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/group", group::router())
        .nest("/size", size::router())
        .nest("/line", line::router())
        .nest("/type", ty::router())
}

/// Create request body shared by the flat taxonomy entities.
#[derive(Debug, Deserialize)]
pub struct CreateTaxonomyRequest {
    pub name: Option<String>,
    pub sku_shortcode: Option<String>,
    pub display: Option<bool>,
    pub id: Option<Value>,
}

/// Update request body shared by the flat taxonomy entities.
#[derive(Debug, Deserialize)]
pub struct UpdateTaxonomyRequest {
    pub name: Option<String>,
    pub sku_shortcode: Option<String>,
    pub display: Option<bool>,
    pub id: Option<Value>,
}

macro_rules! taxonomy_handlers {
    ($mod_name:ident, $repo:ident, $record:ty, $id:ty) => {
        pub mod $mod_name {
            use super::*;

            /// Build this entity's router.
            pub fn router() -> Router<AppState> {
                Router::new()
                    .route("/", post(create).get(read_all))
                    .route("/{id}", get(read).put(update).delete(remove))
            }

            /// Create a record. Elevated only.
            ///
            /// # Errors
            ///
            /// Returns 400 with an itemized field list on validation failure.
            pub async fn create(
                RequireAuth(current): RequireAuth,
                State(state): State<AppState>,
                Json(body): Json<CreateTaxonomyRequest>,
            ) -> Result<(StatusCode, Json<$record>)> {
                ensure_elevated(&current)?;

                let mut rules = FieldRules::new();
                rules
                    .require_str("name", body.name.as_deref())
                    .require_str("sku_shortcode", body.sku_shortcode.as_deref())
                    .require("display", body.display.as_ref())
                    .forbid("id", body.id.as_ref());
                rules.finish()?;

                let record = $repo::new(state.pool())
                    .create(NewTaxonomyEntry {
                        name: body.name.unwrap_or_default(),
                        sku_shortcode: body.sku_shortcode.unwrap_or_default(),
                        display: body.display.unwrap_or_default(),
                    })
                    .await?;

                Ok((StatusCode::CREATED, Json(record)))
            }

            /// Read one record.
            ///
            /// # Errors
            ///
            /// Returns 404 if the ID doesn't resolve.
            pub async fn read(
                RequireAuth(_current): RequireAuth,
                State(state): State<AppState>,
                Path(id): Path<i32>,
            ) -> Result<Json<$record>> {
                let record = $repo::new(state.pool())
                    .get(<$id>::new(id))
                    .await?
                    .ok_or(AppError::NotFound)?;

                Ok(Json(record))
            }

            /// List every record.
            ///
            /// # Errors
            ///
            /// Returns 400 if the store query fails.
            pub async fn read_all(
                RequireAuth(_current): RequireAuth,
                State(state): State<AppState>,
            ) -> Result<Json<Vec<$record>>> {
                let records = $repo::new(state.pool()).list().await?;
                Ok(Json(records))
            }

            /// Update a record. Elevated only.
            ///
            /// # Errors
            ///
            /// Returns 400 on forbidden fields, 404 if the record doesn't exist.
            pub async fn update(
                RequireAuth(current): RequireAuth,
                State(state): State<AppState>,
                Path(id): Path<i32>,
                Json(body): Json<UpdateTaxonomyRequest>,
            ) -> Result<Json<$record>> {
                ensure_elevated(&current)?;

                let mut rules = FieldRules::new();
                rules.forbid("id", body.id.as_ref());
                rules.finish()?;

                let record = $repo::new(state.pool())
                    .update(
                        <$id>::new(id),
                        TaxonomyChanges {
                            name: body.name,
                            sku_shortcode: body.sku_shortcode,
                            display: body.display,
                        },
                    )
                    .await?;

                Ok(Json(record))
            }

            /// Delete a record. Elevated only.
            ///
            /// # Errors
            ///
            /// Returns 404 if the record doesn't exist.
            pub async fn remove(
                RequireAuth(current): RequireAuth,
                State(state): State<AppState>,
                Path(id): Path<i32>,
            ) -> Result<Json<Value>> {
                ensure_elevated(&current)?;

                $repo::new(state.pool()).delete(<$id>::new(id)).await?;

                Ok(Json(json!({ "status": "ok" })))
            }
        }
    };
}

taxonomy_handlers!(group, GroupRepository, Group, GroupId);
taxonomy_handlers!(line, LineRepository, Line, LineId);
taxonomy_handlers!(ty, TypeRepository, SkuType, TypeId);

/// Size handlers: same shape plus the required type reference.
pub mod size {
    use super::*;

    /// Build the size router.
    pub fn router() -> Router<AppState> {
        Router::new()
            .route("/", post(create).get(read_all))
            .route("/{id}", get(read).put(update).delete(remove))
    }

    /// A size with its type resolved.
    #[derive(Debug, Serialize)]
    pub struct SizeResponse {
        #[serde(flatten)]
        pub size: Size,
        #[serde(rename = "type")]
        pub sku_type: SkuType,
    }

    /// Resolve the type reference for a response.
    async fn populate(state: &AppState, size: Size) -> Result<SizeResponse> {
        let sku_type = TypeRepository::new(state.pool())
            .get(size.type_id)
            .await?
            .ok_or_else(|| {
                crate::db::RepositoryError::DataCorruption(format!(
                    "size {} references missing type {}",
                    size.id, size.type_id
                ))
            })?;

        Ok(SizeResponse { size, sku_type })
    }

    /// Create request body.
    #[derive(Debug, Deserialize)]
    pub struct CreateSizeRequest {
        pub name: Option<String>,
        pub sku_shortcode: Option<String>,
        pub type_id: Option<i32>,
        pub display: Option<bool>,
        pub id: Option<Value>,
    }

    /// Update request body.
    #[derive(Debug, Deserialize)]
    pub struct UpdateSizeRequest {
        pub name: Option<String>,
        pub sku_shortcode: Option<String>,
        pub type_id: Option<i32>,
        pub display: Option<bool>,
        pub id: Option<Value>,
    }

    /// Create a size. Elevated only.
    ///
    /// # Errors
    ///
    /// Returns 400 with an itemized field list on validation failure.
    pub async fn create(
        RequireAuth(current): RequireAuth,
        State(state): State<AppState>,
        Json(body): Json<CreateSizeRequest>,
    ) -> Result<(StatusCode, Json<SizeResponse>)> {
        ensure_elevated(&current)?;

        let mut rules = FieldRules::new();
        rules
            .require_str("name", body.name.as_deref())
            .require_str("sku_shortcode", body.sku_shortcode.as_deref())
            .require("type_id", body.type_id.as_ref())
            .require("display", body.display.as_ref())
            .forbid("id", body.id.as_ref());
        rules.finish()?;

        let size = SizeRepository::new(state.pool())
            .create(NewSize {
                name: body.name.unwrap_or_default(),
                sku_shortcode: body.sku_shortcode.unwrap_or_default(),
                type_id: TypeId::new(body.type_id.unwrap_or_default()),
                display: body.display.unwrap_or_default(),
            })
            .await?;

        let populated = populate(&state, size).await?;
        Ok((StatusCode::CREATED, Json(populated)))
    }

    /// Read one size with its type populated.
    ///
    /// # Errors
    ///
    /// Returns 404 if the ID doesn't resolve.
    pub async fn read(
        RequireAuth(_current): RequireAuth,
        State(state): State<AppState>,
        Path(id): Path<i32>,
    ) -> Result<Json<SizeResponse>> {
        let size = SizeRepository::new(state.pool())
            .get(SizeId::new(id))
            .await?
            .ok_or(AppError::NotFound)?;

        let populated = populate(&state, size).await?;
        Ok(Json(populated))
    }

    /// List every size.
    ///
    /// # Errors
    ///
    /// Returns 400 if the store query fails.
    pub async fn read_all(
        RequireAuth(_current): RequireAuth,
        State(state): State<AppState>,
    ) -> Result<Json<Vec<Size>>> {
        let sizes = SizeRepository::new(state.pool()).list().await?;
        Ok(Json(sizes))
    }

    /// Update a size. Elevated only.
    ///
    /// # Errors
    ///
    /// Returns 400 on forbidden fields, 404 if the size doesn't exist.
    pub async fn update(
        RequireAuth(current): RequireAuth,
        State(state): State<AppState>,
        Path(id): Path<i32>,
        Json(body): Json<UpdateSizeRequest>,
    ) -> Result<Json<SizeResponse>> {
        ensure_elevated(&current)?;

        let mut rules = FieldRules::new();
        rules.forbid("id", body.id.as_ref());
        rules.finish()?;

        let size = SizeRepository::new(state.pool())
            .update(
                SizeId::new(id),
                SizeChanges {
                    name: body.name,
                    sku_shortcode: body.sku_shortcode,
                    type_id: body.type_id.map(TypeId::new),
                    display: body.display,
                },
            )
            .await?;

        let populated = populate(&state, size).await?;
        Ok(Json(populated))
    }

    /// Delete a size. Elevated only.
    ///
    /// # Errors
    ///
    /// Returns 404 if the size doesn't exist.
    pub async fn remove(
        RequireAuth(current): RequireAuth,
        State(state): State<AppState>,
        Path(id): Path<i32>,
    ) -> Result<Json<Value>> {
        ensure_elevated(&current)?;

        SizeRepository::new(state.pool()).delete(SizeId::new(id)).await?;

        Ok(Json(json!({ "status": "ok" })))
    }
}
