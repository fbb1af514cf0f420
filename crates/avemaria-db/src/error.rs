//! Error types for the persistence layer.
//!
//! Every repository returns [`DbResult`]. The variants split into two
//! groups: expected outcomes the API translates for the client
//! (`NotFound`, `InsufficientStock`, `Duplicate`) and infrastructure
//! failures that surface as a generic server error
//! (`ConnectionFailed`, `MigrationFailed`, `QueryFailed`, ...).

use thiserror::Error;

/// Errors raised by the repositories and the inventory ledger.
#[derive(Debug, Error)]
pub enum DbError {
    /// A referenced row does not exist (or is soft-deleted where the
    /// operation only accepts live rows).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Not enough stock to complete a sale line.
    ///
    /// Raised when the conditional stock decrement affects zero rows, which
    /// means the requested quantity exceeded what was available at the
    /// moment of the update. The whole sale transaction rolls back.
    #[error("Insufficient stock for \"{name}\" ({reference}): available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        reference: String,
        available: i64,
        requested: i64,
    },

    /// A UNIQUE index rejected the write, e.g. a second product with the
    /// same ref. `field` carries the `table.column` SQLite reports.
    #[error("Duplicate value for {field}")]
    Duplicate { field: String },

    /// A foreign key rejected the write.
    #[error("Invalid reference: {message}")]
    ForeignKeyViolation { message: String },

    /// The database file could not be opened or the pool could not connect.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration did not apply cleanly.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The statement itself failed (constraint other than the above,
    /// SQLITE_BUSY, malformed runtime SQL, ...).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection was in use for longer than the acquire
    /// timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that has no mapping above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for [`DbError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => match db_err.kind() {
                // SQLite phrases this "UNIQUE constraint failed:
                // products.ref"; the tail is the offending column.
                sqlx::error::ErrorKind::UniqueViolation => DbError::Duplicate {
                    field: db_err
                        .message()
                        .rsplit(": ")
                        .next()
                        .unwrap_or("unknown")
                        .to_string(),
                },

                sqlx::error::ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },

                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result alias used across the persistence layer.
pub type DbResult<T> = Result<T, DbError>;
