use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use crate::application::ports::RepositoryError;
use crate::application::services::RetryPolicy;

const CONNECT_ATTEMPTS: u32 = 6;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects with backoff so the gateway can start alongside a database that is still booting.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let options = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT);

    let pool = RetryPolicy::new(CONNECT_ATTEMPTS, Duration::from_millis(500))
        .run(
            "postgres_connect",
            |_: &sqlx::Error| true,
            || options.clone().connect(url),
        )
        .await
        .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

    info!(max_connections, "PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the embedded schema migrations.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(format!("migration: {}", e)))?;
    info!("Database migrations applied");
    Ok(())
}

/// Maps driver errors, distinguishing unique/foreign key violations.
pub(crate) fn map_sqlx_error(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(error.to_string())
        }
        _ => RepositoryError::QueryFailed(error.to_string()),
    }
}
