//! Address repository and the billing/shipping flag-sync rule.
//!
//! Addresses are the one place a single logical write spans several rows:
//! promoting an address to billing/shipping demotes its siblings and moves
//! the owner's denormalized pointer. Every write here runs inside one
//! transaction that first locks the owner's `users` row, so concurrent
//! promotions for the same user serialize and no reader ever observes two
//! addresses flagged for the same user. The decision of what to apply is
//! [`plan_flag_sync`]; this module only executes the plan.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};

use goria_core::{AddressId, UserId, dialable};

use super::RepositoryError;
use crate::models::{Address, FlagSync, plan_flag_sync};

const ADDRESS_COLUMNS: &str = "id, user_id, name, address1, address2, zip, city, state, country, \
     phone, twilio, instructions, billing, shipping, created_at, updated_at";

/// Raw `addresses` row.
#[derive(Debug, FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    name: String,
    address1: String,
    address2: Option<String>,
    zip: String,
    city: String,
    state: String,
    country: String,
    phone: String,
    twilio: String,
    instructions: Option<String>,
    billing: bool,
    shipping: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            address1: row.address1,
            address2: row.address2,
            zip: row.zip,
            city: row.city,
            state: row.state,
            country: row.country,
            phone: row.phone,
            twilio: row.twilio,
            instructions: row.instructions,
            billing: row.billing,
            shipping: row.shipping,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating an address. `twilio` is always derived, never taken
/// from the caller.
#[derive(Debug)]
pub struct NewAddress {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub zip: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub phone: String,
    pub instructions: Option<String>,
    pub billing: Option<bool>,
    pub shipping: Option<bool>,
}

/// Partial update of an address. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct AddressChanges {
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
}

impl AddressChanges {
    const fn has_scalar_changes(&self) -> bool {
        self.name.is_some()
            || self.address1.is_some()
            || self.address2.is_some()
            || self.zip.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.country.is_some()
            || self.phone.is_some()
            || self.instructions.is_some()
    }
}

/// Equality filters for listing addresses.
#[derive(Debug, Default)]
pub struct AddressFilter {
    pub user_id: Option<UserId>,
    pub billing: Option<bool>,
    pub shipping: Option<bool>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Which of the two independent flags a sync step operates on.
#[derive(Debug, Clone, Copy)]
enum FlagKind {
    Billing,
    Shipping,
}

impl FlagKind {
    const ALL: [Self; 2] = [Self::Billing, Self::Shipping];

    const fn flag_column(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }

    const fn pointer_column(self) -> &'static str {
        match self {
            Self::Billing => "billing_address_id",
            Self::Shipping => "shipping_address_id",
        }
    }

    const fn requested(self, changes: &AddressChanges) -> Option<bool> {
        match self {
            Self::Billing => changes.billing,
            Self::Shipping => changes.shipping,
        }
    }

    const fn current(self, row: &AddressRow) -> bool {
        match self {
            Self::Billing => row.billing,
            Self::Shipping => row.shipping,
        }
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an address for `user_id`, applying flag sync for any
    /// requested billing/shipping flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        new: NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_owner(&mut *tx, user_id).await?;

        let twilio = dialable(&new.phone);
        let row: AddressRow = sqlx::query_as(&format!(
            "INSERT INTO addresses \
             (user_id, name, address1, address2, zip, city, state, country, phone, twilio, instructions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.address1)
        .bind(&new.address2)
        .bind(&new.zip)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.country)
        .bind(&new.phone)
        .bind(&twilio)
        .bind(&new.instructions)
        .fetch_one(&mut *tx)
        .await?;

        let id = AddressId::new(row.id);
        for kind in FlagKind::ALL {
            let requested = match kind {
                FlagKind::Billing => new.billing,
                FlagKind::Shipping => new.shipping,
            };
            // A freshly inserted row has both flags false.
            sync_flag(&mut *tx, kind, user_id, id, plan_flag_sync(requested, false)).await?;
        }

        let row = fetch(&mut *tx, id).await?.ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(row.into())
    }

    /// Get an address by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List addresses matching the filter, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &AddressFilter) -> Result<Vec<Address>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE TRUE"
        ));
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(billing) = filter.billing {
            qb.push(" AND billing = ").push_bind(billing);
        }
        if let Some(shipping) = filter.shipping {
            qb.push(" AND shipping = ").push_bind(shipping);
        }
        if let Some(city) = &filter.city {
            qb.push(" AND city = ").push_bind(city);
        }
        if let Some(state) = &filter.state {
            qb.push(" AND state = ").push_bind(state);
        }
        if let Some(zip) = &filter.zip {
            qb.push(" AND zip = ").push_bind(zip);
        }
        if let Some(country) = &filter.country {
            qb.push(" AND country = ").push_bind(country);
        }
        qb.push(" ORDER BY id");

        let rows: Vec<AddressRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update, re-deriving `twilio` for a phone change and
    /// running flag sync for any billing/shipping transition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: AddressId,
        changes: AddressChanges,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Resolve the owner before taking any row lock: the owner lock
        // always comes first, so writers for one user queue in the same
        // order everywhere.
        let current = fetch(&mut *tx, id).await?.ok_or(RepositoryError::NotFound)?;
        let user_id = UserId::new(current.user_id);
        lock_owner(&mut *tx, user_id).await?;
        let current = fetch_locked(&mut *tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if changes.has_scalar_changes() {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE addresses SET updated_at = NOW()");
            if let Some(name) = &changes.name {
                qb.push(", name = ").push_bind(name);
            }
            if let Some(address1) = &changes.address1 {
                qb.push(", address1 = ").push_bind(address1);
            }
            if let Some(address2) = &changes.address2 {
                qb.push(", address2 = ").push_bind(address2);
            }
            if let Some(zip) = &changes.zip {
                qb.push(", zip = ").push_bind(zip);
            }
            if let Some(city) = &changes.city {
                qb.push(", city = ").push_bind(city);
            }
            if let Some(state) = &changes.state {
                qb.push(", state = ").push_bind(state);
            }
            if let Some(country) = &changes.country {
                qb.push(", country = ").push_bind(country);
            }
            if let Some(instructions) = &changes.instructions {
                qb.push(", instructions = ").push_bind(instructions);
            }
            if let Some(phone) = &changes.phone {
                qb.push(", phone = ").push_bind(phone);
                qb.push(", twilio = ").push_bind(dialable(phone));
            }
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }

        for kind in FlagKind::ALL {
            let plan = plan_flag_sync(kind.requested(&changes), kind.current(&current));
            sync_flag(&mut *tx, kind, user_id, id, plan).await?;
        }

        let row = fetch(&mut *tx, id).await?.ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete an address, clearing any owner pointer that references it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = fetch(&mut *tx, id).await?.ok_or(RepositoryError::NotFound)?;
        let user_id = UserId::new(row.user_id);
        lock_owner(&mut *tx, user_id).await?;

        for kind in FlagKind::ALL {
            sqlx::query(&format!(
                "UPDATE users SET {pointer} = NULL, updated_at = NOW() \
                 WHERE id = $1 AND {pointer} = $2",
                pointer = kind.pointer_column()
            ))
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Lock the owning `users` row for the duration of the transaction.
///
/// This is the critical section: flag sync touches the target address, its
/// siblings, and the owner row, and the owner lock serializes all of it
/// per user.
async fn lock_owner(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    found.map(|_| ()).ok_or(RepositoryError::NotFound)
}

async fn fetch(conn: &mut PgConnection, id: AddressId) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

async fn fetch_locked(
    conn: &mut PgConnection,
    id: AddressId,
) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Execute one flag's sync plan inside the caller's transaction.
async fn sync_flag(
    conn: &mut PgConnection,
    kind: FlagKind,
    user_id: UserId,
    address_id: AddressId,
    plan: FlagSync,
) -> Result<(), sqlx::Error> {
    let flag = kind.flag_column();
    let pointer = kind.pointer_column();

    match plan {
        FlagSync::Promote => {
            sqlx::query(&format!(
                "UPDATE addresses SET {flag} = FALSE, updated_at = NOW() \
                 WHERE user_id = $1 AND {flag} AND id <> $2"
            ))
            .bind(user_id)
            .bind(address_id)
            .execute(&mut *conn)
            .await?;

            sqlx::query(&format!(
                "UPDATE addresses SET {flag} = TRUE, updated_at = NOW() WHERE id = $1"
            ))
            .bind(address_id)
            .execute(&mut *conn)
            .await?;

            sqlx::query(&format!(
                "UPDATE users SET {pointer} = $1, updated_at = NOW() WHERE id = $2"
            ))
            .bind(address_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        }
        FlagSync::Demote => {
            sqlx::query(&format!(
                "UPDATE addresses SET {flag} = FALSE, updated_at = NOW() WHERE id = $1"
            ))
            .bind(address_id)
            .execute(&mut *conn)
            .await?;

            // Only clear the pointer if it references the demoted address;
            // demoting a non-current address must not touch it.
            sqlx::query(&format!(
                "UPDATE users SET {pointer} = NULL, updated_at = NOW() \
                 WHERE id = $1 AND {pointer} = $2"
            ))
            .bind(user_id)
            .bind(address_id)
            .execute(&mut *conn)
            .await?;
        }
        FlagSync::Unchanged => {}
    }

    Ok(())
}
