//! Inventory Ledger

pub mod errors;
mod ledger;

pub use errors::InventoryError;
pub use ledger::*;
