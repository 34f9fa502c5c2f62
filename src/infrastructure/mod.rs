pub mod http;
pub mod observability;
pub mod persistence;
pub mod venues;

pub use persistence::{Database, SqliteStore};
