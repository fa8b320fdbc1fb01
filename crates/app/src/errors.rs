//! Error classification shared by every service.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Stable, machine-readable classification of a service failure.
///
/// Callers branch on the kind rather than on individual error variants; the
/// string form is what clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input the caller can fix.
    Validation,

    /// Unknown product, order or payment.
    NotFound,

    /// Not enough inventory to satisfy a line.
    InsufficientStock,

    /// Operation is illegal for the current order or payment status.
    StateConflict,

    /// A provider payload failed signature verification.
    Authenticity,

    /// The payment provider could not be reached or rejected the request.
    Provider,

    /// The unit of work ran out of time or lost a lock race; retrying is safe.
    Transient,

    /// Datastore failure.
    Persistence,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::InsufficientStock => "insufficient_stock",
            Self::StateConflict => "state_conflict",
            Self::Authenticity => "authenticity_error",
            Self::Provider => "provider_error",
            Self::Transient => "transient_error",
            Self::Persistence => "persistence_error",
        }
    }

    /// Whether the failure was caused by the request rather than the system.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::Validation
                | Self::NotFound
                | Self::InsufficientStock
                | Self::StateConflict
                | Self::Authenticity
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
