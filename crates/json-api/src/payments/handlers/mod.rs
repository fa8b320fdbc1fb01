//! Payment Handlers

pub(crate) mod create_intent;
pub(crate) mod webhook;
