//! Database connection management and the unit-of-work primitive.

use std::time::Duration;

use sqlx::{
    Error, PgPool, Postgres, Transaction,
    error::{DatabaseError, ErrorKind},
    postgres::PgPoolOptions,
    query,
};
use thiserror::Error;
use tokio::time;

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// `query_canceled`, raised when `statement_timeout` expires.
const QUERY_CANCELED: &str = "57014";

/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";

/// Pool sizing and connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// The unit of work exceeded its deadline and was rolled back.
#[derive(Debug, Clone, Copy, Error)]
#[error("unit of work exceeded its {0:?} deadline")]
pub struct DeadlineExceeded(pub Duration);

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    timeout: Duration,
}

impl Db {
    /// Default deadline for a single unit of work.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction whose lock waits and statements cannot outlive the
    /// unit-of-work deadline.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or applying the timeouts fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, Error> {
        let mut tx = self.pool.begin().await?;

        let millis = self.timeout.as_millis().to_string();

        query("SELECT set_config('lock_timeout', $1, true), set_config('statement_timeout', $1, true)")
            .bind(millis)
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }

    /// Run `work` under the unit-of-work deadline.
    ///
    /// On expiry the future is dropped together with any open transaction it
    /// owns, which rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or [`DeadlineExceeded`] converted
    /// into the caller's error type.
    pub async fn within_deadline<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<DeadlineExceeded>,
    {
        match time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_elapsed) => Err(DeadlineExceeded(self.timeout).into()),
        }
    }
}

/// How a failed statement should be reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageFailure {
    NotFound,
    AlreadyExists,
    InvalidReference,
    InvalidData,
    Timeout,
    Conflict,
    Other,
}

pub(crate) fn classify(error: &Error) -> StorageFailure {
    if matches!(error, Error::RowNotFound) {
        return StorageFailure::NotFound;
    }

    if matches!(error, Error::PoolTimedOut) {
        return StorageFailure::Timeout;
    }

    let Some(database_error) = error.as_database_error() else {
        return StorageFailure::Other;
    };

    match database_error.code().as_deref() {
        Some(LOCK_NOT_AVAILABLE | QUERY_CANCELED) => return StorageFailure::Timeout,
        Some(DEADLOCK_DETECTED | SERIALIZATION_FAILURE) => return StorageFailure::Conflict,
        _ => {}
    }

    match DatabaseError::kind(database_error) {
        ErrorKind::UniqueViolation => StorageFailure::AlreadyExists,
        ErrorKind::ForeignKeyViolation => StorageFailure::InvalidReference,
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => StorageFailure::InvalidData,
        ErrorKind::Other | _ => StorageFailure::Other,
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(options: &DatabaseOptions) -> Result<PgPool, Error> {
    PgPoolOptions::new()
        .max_connections(options.max_connections)
        .min_connections(options.min_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect(&options.url)
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
