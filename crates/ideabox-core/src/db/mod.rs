//! libSQL-backed local store

mod connection;
mod migrations;
mod store;

pub use connection::Database;
pub use store::LibSqlStore;
