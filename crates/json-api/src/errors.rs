//! Errors

use std::error::Error;

use salvo::http::StatusError;
use tracing::{error, warn};

use checkout_app::{
    domain::{
        checkout::CheckoutServiceError, orders::OrdersServiceError,
        payments::PaymentsServiceError,
    },
    errors::ErrorKind,
};

/// A service failure that knows its [`ErrorKind`].
pub(crate) trait ServiceError: Error + Send + Sync + 'static {
    fn kind(&self) -> ErrorKind;
}

impl ServiceError for CheckoutServiceError {
    fn kind(&self) -> ErrorKind {
        CheckoutServiceError::kind(self)
    }
}

impl ServiceError for OrdersServiceError {
    fn kind(&self) -> ErrorKind {
        OrdersServiceError::kind(self)
    }
}

impl ServiceError for PaymentsServiceError {
    fn kind(&self) -> ErrorKind {
        PaymentsServiceError::kind(self)
    }
}

/// Render a service failure.
///
/// `brief` carries the human message and `detail` the stable kind string.
/// Server-side causes are logged here and never rendered.
pub(crate) fn into_status_error<E: ServiceError>(error: E) -> StatusError {
    let kind = error.kind();

    let status = match kind {
        ErrorKind::Validation | ErrorKind::Authenticity => StatusError::bad_request(),
        ErrorKind::NotFound => StatusError::not_found(),
        ErrorKind::InsufficientStock | ErrorKind::StateConflict => StatusError::conflict(),
        ErrorKind::Provider => StatusError::bad_gateway(),
        ErrorKind::Transient => StatusError::service_unavailable(),
        ErrorKind::Persistence => StatusError::internal_server_error(),
    };

    if kind.is_client_error() {
        warn!(kind = %kind, "{error}");
    } else {
        error!(kind = %kind, error = ?error, "request failed");
    }

    status
        .brief(error.to_string())
        .detail(kind.as_str())
        .cause(error)
}
