pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::{register_functions, Database, DbConnection, DbPool, UNICODE_LOWER_FN};
