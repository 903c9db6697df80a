use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

use crate::db::errors::{DatabaseError, Result};

/// Create the connection pool used by the server
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(60))
        // Test connection on checkout to ensure it's still valid
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("Failed to create pool: {}", e)))?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Apply the schema in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Health check for the database connection
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Execute a function with retry logic for handling transient errors and lost
/// check-then-insert races
pub async fn with_retry<F, Fut, T>(
    max_retries: u8,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                warn!(
                    attempt = attempt,
                    max_retries = max_retries,
                    error = %e,
                    "Retryable error occurred, retrying..."
                );

                // Exponential backoff with jitter
                let delay_ms = (10 * 2_u64.pow(attempt as u32 - 1))
                    .min(500)  // Cap at half a second
                    + fastrand::u64(0..25);

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(e) if e.is_retryable() => {
                warn!(attempts = attempt, error = %e, "Giving up after retryable errors");
                return Err(DatabaseError::RetryLimitExceeded {
                    attempts: max_retries,
                    last_error: Box::new(e),
                });
            }
            Err(e) => return Err(e),
        }
    }
}
