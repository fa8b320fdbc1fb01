//! Payments service errors.

use thiserror::Error;

use crate::{
    database::{DeadlineExceeded, StorageFailure, classify},
    domain::{orders::status::OrderStatus, payments::provider::ProviderError},
    errors::ErrorKind,
};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("order not found")]
    OrderNotFound,

    #[error("order is {0}, payment intents can only be created for pending orders")]
    OrderNotPending(OrderStatus),

    /// Deliberately vague about which part of verification failed.
    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("malformed webhook payload")]
    MalformedPayload,

    #[error("payment provider error")]
    Provider(#[source] ProviderError),

    #[error("payment already recorded for this provider reference")]
    DuplicateReference,

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    #[error("payment storage is busy")]
    Contention(#[source] sqlx::Error),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl PaymentsServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OrderNotFound => ErrorKind::NotFound,
            Self::OrderNotPending(_) | Self::DuplicateReference => ErrorKind::StateConflict,
            Self::InvalidSignature => ErrorKind::Authenticity,
            Self::MalformedPayload => ErrorKind::Validation,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Deadline(_) | Self::Contention(_) => ErrorKind::Transient,
            Self::Sql(_) => ErrorKind::Persistence,
        }
    }
}

impl From<ProviderError> for PaymentsServiceError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidSignature => Self::InvalidSignature,
            ProviderError::MalformedPayload(_) => Self::MalformedPayload,
            other => Self::Provider(other),
        }
    }
}

impl From<sqlx::Error> for PaymentsServiceError {
    fn from(error: sqlx::Error) -> Self {
        match classify(&error) {
            StorageFailure::NotFound => Self::OrderNotFound,
            StorageFailure::AlreadyExists => Self::DuplicateReference,
            StorageFailure::Timeout | StorageFailure::Conflict => Self::Contention(error),
            _ => Self::Sql(error),
        }
    }
}
