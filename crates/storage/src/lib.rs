pub mod database;
pub mod dto;
pub mod error;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use database::Database;
pub use error::{Result, StorageError};
pub use store::{MatchStore, PgStore, RatingStore};
