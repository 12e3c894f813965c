//! Settings repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use goria_core::SettingId;

use super::RepositoryError;
use crate::models::Setting;

const SETTING_COLUMNS: &str = "id, name, incoming_order_alert_email, incoming_return_alert_email, \
     incoming_review_alert_email, default_shipping_cost, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SettingRow {
    id: i32,
    name: String,
    incoming_order_alert_email: Option<String>,
    incoming_return_alert_email: Option<String>,
    incoming_review_alert_email: Option<String>,
    default_shipping_cost: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SettingRow> for Setting {
    fn from(row: SettingRow) -> Self {
        Self {
            id: SettingId::new(row.id),
            name: row.name,
            incoming_order_alert_email: row.incoming_order_alert_email,
            incoming_return_alert_email: row.incoming_return_alert_email,
            incoming_review_alert_email: row.incoming_review_alert_email,
            default_shipping_cost: row.default_shipping_cost,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating a setting.
#[derive(Debug)]
pub struct NewSetting {
    pub name: String,
    pub incoming_order_alert_email: Option<String>,
    pub incoming_return_alert_email: Option<String>,
    pub incoming_review_alert_email: Option<String>,
    pub default_shipping_cost: Option<Decimal>,
}

/// Partial update of a setting. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct SettingChanges {
    pub name: Option<String>,
    pub incoming_order_alert_email: Option<String>,
    pub incoming_return_alert_email: Option<String>,
    pub incoming_review_alert_email: Option<String>,
    pub default_shipping_cost: Option<Decimal>,
}

/// Repository for settings records.
pub struct SettingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a setting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: NewSetting) -> Result<Setting, RepositoryError> {
        let row: SettingRow = sqlx::query_as(&format!(
            "INSERT INTO settings \
             (name, incoming_order_alert_email, incoming_return_alert_email, \
              incoming_review_alert_email, default_shipping_cost) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SETTING_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.incoming_order_alert_email)
        .bind(&new.incoming_return_alert_email)
        .bind(&new.incoming_review_alert_email)
        .bind(new.default_shipping_cost)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a setting by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SettingId) -> Result<Option<Setting>, RepositoryError> {
        let row: Option<SettingRow> =
            sqlx::query_as(&format!("SELECT {SETTING_COLUMNS} FROM settings WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// List every setting, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Setting>, RepositoryError> {
        let rows: Vec<SettingRow> =
            sqlx::query_as(&format!("SELECT {SETTING_COLUMNS} FROM settings ORDER BY name"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the setting doesn't exist.
    pub async fn update(
        &self,
        id: SettingId,
        changes: SettingChanges,
    ) -> Result<Setting, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE settings SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(email) = &changes.incoming_order_alert_email {
            qb.push(", incoming_order_alert_email = ").push_bind(email);
        }
        if let Some(email) = &changes.incoming_return_alert_email {
            qb.push(", incoming_return_alert_email = ").push_bind(email);
        }
        if let Some(email) = &changes.incoming_review_alert_email {
            qb.push(", incoming_review_alert_email = ").push_bind(email);
        }
        if let Some(cost) = changes.default_shipping_cost {
            qb.push(", default_shipping_cost = ").push_bind(cost);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {SETTING_COLUMNS}"));

        let row: Option<SettingRow> = qb.build_query_as().fetch_optional(self.pool).await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a setting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the setting doesn't exist.
    pub async fn delete(&self, id: SettingId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM settings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
