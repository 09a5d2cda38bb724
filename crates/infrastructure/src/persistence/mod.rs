//! Persistence module
//!
//! SQLite storage for query records.

pub mod async_connection;
pub mod error;
pub mod query_record_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use error::map_sqlx_error;
pub use query_record_store::SqliteQueryRecordStore;
