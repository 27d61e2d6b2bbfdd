pub mod auth;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod mimics;
pub mod posts;
pub mod profiles;
pub mod recommendations;
pub mod search;
pub mod tags;
pub mod upload;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;

use uuid::Uuid;

/// Parse an id from the path; a malformed id can never name an existing row
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{what} not found")))
}
