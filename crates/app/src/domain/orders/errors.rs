//! Orders service errors.

use thiserror::Error;

use crate::{
    database::{DeadlineExceeded, StorageFailure, classify},
    domain::orders::status::{IllegalTransition, InvalidStatus},
    errors::ErrorKind,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    /// Lock wait, statement timeout or deadlock; the work was rolled back.
    #[error("order storage is busy")]
    Contention(#[source] sqlx::Error),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl OrdersServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidStatus(_) => ErrorKind::Validation,
            Self::IllegalTransition(_) => ErrorKind::StateConflict,
            Self::Deadline(_) | Self::Contention(_) => ErrorKind::Transient,
            Self::Sql(_) => ErrorKind::Persistence,
        }
    }
}

impl From<sqlx::Error> for OrdersServiceError {
    fn from(error: sqlx::Error) -> Self {
        match classify(&error) {
            StorageFailure::NotFound => Self::NotFound,
            StorageFailure::Timeout | StorageFailure::Conflict => Self::Contention(error),
            _ => Self::Sql(error),
        }
    }
}
