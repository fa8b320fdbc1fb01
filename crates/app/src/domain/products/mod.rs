//! Products

pub mod records;
pub(crate) mod repository;

pub(crate) use repository::PgProductsRepository;
