use thiserror::Error;

/// Unique constraint on `users.clerk_user_id`
pub const USER_CLERK_ID_CONSTRAINT: &str = "users_clerk_user_id_key";
/// Unique constraint on `users.email`
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";
/// Unique constraint on `blogs.slug`
pub const BLOG_SLUG_CONSTRAINT: &str = "blogs_slug_key";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Query execution error: {0}")]
    QueryError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Unique constraint violation: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Integrity constraint violation: {0}")]
    IntegrityError(String),

    #[error("Retry limit exceeded after {attempts} attempts: {last_error}")]
    RetryLimitExceeded {
        attempts: u8,
        #[source]
        last_error: Box<DatabaseError>,
    },
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let classified = err.as_database_error().and_then(|db_error| {
            // PostgreSQL integrity constraint violation codes
            match db_error.code().as_deref() {
                Some("23505") => Some(Self::UniqueViolation {
                    constraint: db_error.constraint().unwrap_or_default().to_string(),
                }),
                Some("23503") | Some("23502") => {
                    Some(Self::IntegrityError(db_error.message().to_string()))
                }
                _ => None,
            }
        });

        match classified {
            Some(classified) => classified,
            None => match err {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                    Self::ConnectionError(err.to_string())
                }
                _ => Self::QueryError(err),
            },
        }
    }
}

impl DatabaseError {
    /// Check if this is a unique violation on the given constraint
    pub fn is_unique_violation_on(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            // A lost check-then-insert race; the caller re-probes on retry
            Self::UniqueViolation { .. } => true,
            Self::QueryError(e) => {
                // Check for transient errors like deadlocks or serialization failures
                if let Some(db_error) = e.as_database_error() {
                    matches!(db_error.code().as_deref(),
                        Some("40001") | // serialization_failure
                        Some("40P01")   // deadlock_detected
                    )
                } else {
                    false
                }
            }
            Self::ConnectionError(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
