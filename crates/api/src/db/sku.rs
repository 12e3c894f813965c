//! SKU taxonomy repositories.
//!
//! Group, Line, and Type are structurally identical flat records, so their
//! repositories come out of one macro. Size carries an extra reference to
//! its Type and is written out by hand.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use goria_core::{GroupId, LineId, SizeId, TypeId};

use super::RepositoryError;
use crate::models::{Group, Line, Size, SkuType};

/// Raw row shared by the flat taxonomy tables.
#[derive(Debug, FromRow)]
struct TaxonomyRow {
    id: i32,
    name: String,
    sku_shortcode: String,
    display: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

macro_rules! taxonomy_record_from_row {
    ($record:ty, $id:ty) => {
        impl From<TaxonomyRow> for $record {
            fn from(row: TaxonomyRow) -> Self {
                Self {
                    id: <$id>::new(row.id),
                    name: row.name,
                    sku_shortcode: row.sku_shortcode,
                    display: row.display,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            }
        }
    };
}

taxonomy_record_from_row!(Group, GroupId);
taxonomy_record_from_row!(Line, LineId);
taxonomy_record_from_row!(SkuType, TypeId);

/// Fields for creating a flat taxonomy record.
#[derive(Debug)]
pub struct NewTaxonomyEntry {
    pub name: String,
    pub sku_shortcode: String,
    pub display: bool,
}

/// Partial update shared by all taxonomy records.
#[derive(Debug, Default)]
pub struct TaxonomyChanges {
    pub name: Option<String>,
    pub sku_shortcode: Option<String>,
    pub display: Option<bool>,
}

macro_rules! taxonomy_repository {
    ($(#[$meta:meta])* $repo:ident, $record:ty, $id:ty, $table:literal) => {
        $(#[$meta])*
        pub struct $repo<'a> {
            pool: &'a PgPool,
        }

        impl<'a> $repo<'a> {
            /// Create a new repository.
            #[must_use]
            pub const fn new(pool: &'a PgPool) -> Self {
                Self { pool }
            }

            /// Insert a record.
            ///
            /// # Errors
            ///
            /// Returns `RepositoryError::Conflict` if the name or shortcode
            /// is already taken.
            pub async fn create(
                &self,
                new: NewTaxonomyEntry,
            ) -> Result<$record, RepositoryError> {
                let row: TaxonomyRow = sqlx::query_as(concat!(
                    "INSERT INTO ",
                    $table,
                    " (name, sku_shortcode, display) VALUES ($1, $2, $3) \
                     RETURNING id, name, sku_shortcode, display, created_at, updated_at"
                ))
                .bind(&new.name)
                .bind(&new.sku_shortcode)
                .bind(new.display)
                .fetch_one(self.pool)
                .await
                .map_err(sku_conflict)?;

                Ok(row.into())
            }

            /// Get a record by its ID.
            ///
            /// # Errors
            ///
            /// Returns `RepositoryError::Database` if the query fails.
            pub async fn get(&self, id: $id) -> Result<Option<$record>, RepositoryError> {
                let row: Option<TaxonomyRow> = sqlx::query_as(concat!(
                    "SELECT id, name, sku_shortcode, display, created_at, updated_at FROM ",
                    $table,
                    " WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

                Ok(row.map(Into::into))
            }

            /// List every record, by name.
            ///
            /// # Errors
            ///
            /// Returns `RepositoryError::Database` if the query fails.
            pub async fn list(&self) -> Result<Vec<$record>, RepositoryError> {
                let rows: Vec<TaxonomyRow> = sqlx::query_as(concat!(
                    "SELECT id, name, sku_shortcode, display, created_at, updated_at FROM ",
                    $table,
                    " ORDER BY name"
                ))
                .fetch_all(self.pool)
                .await?;

                Ok(rows.into_iter().map(Into::into).collect())
            }

            /// Apply a partial update.
            ///
            /// # Errors
            ///
            /// Returns `RepositoryError::NotFound` if the record doesn't exist.
            /// Returns `RepositoryError::Conflict` on a name/shortcode clash.
            pub async fn update(
                &self,
                id: $id,
                changes: TaxonomyChanges,
            ) -> Result<$record, RepositoryError> {
                let mut qb = QueryBuilder::<Postgres>::new(concat!(
                    "UPDATE ",
                    $table,
                    " SET updated_at = NOW()"
                ));
                if let Some(name) = &changes.name {
                    qb.push(", name = ").push_bind(name);
                }
                if let Some(sku_shortcode) = &changes.sku_shortcode {
                    qb.push(", sku_shortcode = ").push_bind(sku_shortcode);
                }
                if let Some(display) = changes.display {
                    qb.push(", display = ").push_bind(display);
                }
                qb.push(" WHERE id = ").push_bind(id);
                qb.push(" RETURNING id, name, sku_shortcode, display, created_at, updated_at");

                let row: Option<TaxonomyRow> = qb
                    .build_query_as()
                    .fetch_optional(self.pool)
                    .await
                    .map_err(sku_conflict)?;

                row.map(Into::into).ok_or(RepositoryError::NotFound)
            }

            /// Delete a record.
            ///
            /// # Errors
            ///
            /// Returns `RepositoryError::NotFound` if the record doesn't exist.
            pub async fn delete(&self, id: $id) -> Result<(), RepositoryError> {
                let result = sqlx::query(concat!("DELETE FROM ", $table, " WHERE id = $1"))
                    .bind(id)
                    .execute(self.pool)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }

                Ok(())
            }
        }
    };
}

taxonomy_repository!(
    /// Repository for SKU group records.
    GroupRepository,
    Group,
    GroupId,
    "sku_groups"
);
taxonomy_repository!(
    /// Repository for SKU line records.
    LineRepository,
    Line,
    LineId,
    "sku_lines"
);
taxonomy_repository!(
    /// Repository for SKU type records.
    TypeRepository,
    SkuType,
    TypeId,
    "sku_types"
);

// =============================================================================
// Sizes
// =============================================================================

const SIZE_COLUMNS: &str = "id, name, sku_shortcode, type_id, display, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SizeRow {
    id: i32,
    name: String,
    sku_shortcode: String,
    type_id: i32,
    display: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SizeRow> for Size {
    fn from(row: SizeRow) -> Self {
        Self {
            id: SizeId::new(row.id),
            name: row.name,
            sku_shortcode: row.sku_shortcode,
            type_id: TypeId::new(row.type_id),
            display: row.display,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating a size.
#[derive(Debug)]
pub struct NewSize {
    pub name: String,
    pub sku_shortcode: String,
    pub type_id: TypeId,
    pub display: bool,
}

/// Partial update of a size.
#[derive(Debug, Default)]
pub struct SizeChanges {
    pub name: Option<String>,
    pub sku_shortcode: Option<String>,
    pub type_id: Option<TypeId>,
    pub display: Option<bool>,
}

/// Repository for SKU size records.
pub struct SizeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SizeRepository<'a> {
    /// Create a new size repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a size under an existing type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or shortcode is
    /// taken, or if the type doesn't exist.
    pub async fn create(&self, new: NewSize) -> Result<Size, RepositoryError> {
        let row: SizeRow = sqlx::query_as(&format!(
            "INSERT INTO sku_sizes (name, sku_shortcode, type_id, display) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SIZE_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.sku_shortcode)
        .bind(new.type_id)
        .bind(new.display)
        .fetch_one(self.pool)
        .await
        .map_err(sku_conflict)?;

        Ok(row.into())
    }

    /// Get a size by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SizeId) -> Result<Option<Size>, RepositoryError> {
        let row: Option<SizeRow> =
            sqlx::query_as(&format!("SELECT {SIZE_COLUMNS} FROM sku_sizes WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// List every size, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Size>, RepositoryError> {
        let rows: Vec<SizeRow> =
            sqlx::query_as(&format!("SELECT {SIZE_COLUMNS} FROM sku_sizes ORDER BY name"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the size doesn't exist.
    /// Returns `RepositoryError::Conflict` on a clash or unknown type.
    pub async fn update(&self, id: SizeId, changes: SizeChanges) -> Result<Size, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE sku_sizes SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(sku_shortcode) = &changes.sku_shortcode {
            qb.push(", sku_shortcode = ").push_bind(sku_shortcode);
        }
        if let Some(type_id) = changes.type_id {
            qb.push(", type_id = ").push_bind(type_id);
        }
        if let Some(display) = changes.display {
            qb.push(", display = ").push_bind(display);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {SIZE_COLUMNS}"));

        let row: Option<SizeRow> = qb
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(sku_conflict)?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a size.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the size doesn't exist.
    pub async fn delete(&self, id: SizeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM sku_sizes WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Map constraint violations to `Conflict`, passing other errors through.
fn sku_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict("name or sku_shortcode already exists".to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict("unknown type".to_owned());
        }
    }
    RepositoryError::Database(e)
}
