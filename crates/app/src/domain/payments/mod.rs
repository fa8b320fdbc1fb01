//! Payments

pub mod data;
pub mod errors;
pub mod provider;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod stripe;

pub use errors::PaymentsServiceError;
pub use service::*;
