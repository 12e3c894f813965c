//! Seeding commands.
//!
//! Signup only ever produces plain users; the first elevated account has
//! to come from here.

use secrecy::SecretString;

use goria_api::db::{RepositoryError, UserRepository, create_pool};
use goria_api::services::auth::{AuthError, AuthService};
use goria_core::Role;

/// Errors the seed commands can produce.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a user and elevate it to the admin role.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the account already
/// exists, or the writes fail.
pub async fn admin(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("GORIA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("GORIA_DATABASE_URL"))?;

    let pool = create_pool(&SecretString::from(database_url)).await?;

    let user = AuthService::new(&pool)
        .register(first_name, last_name, email, password)
        .await?;
    UserRepository::new(&pool)
        .set_role(user.id, Role::Admin)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "elevated user created");
    Ok(())
}
