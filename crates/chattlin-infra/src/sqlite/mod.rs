//! SQLite storage backed by sqlx.

pub mod kv;
pub mod pool;

pub use kv::SqliteKvStore;
pub use pool::DatabasePool;
