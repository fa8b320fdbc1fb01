//! Checkout core: stock reservation, order lifecycle and payment reconciliation.

pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod uuids;

#[cfg(test)]
mod test;
