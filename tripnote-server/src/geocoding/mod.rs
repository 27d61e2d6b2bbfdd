//! Outbound place search: Nominatim behind a cache and throttle, plus the
//! uncached Yahoo! local search passthroughs.

mod cache;
mod nominatim;
mod proxy;
mod yahoo;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub use cache::InMemoryGeocodeStore;
pub use nominatim::NominatimClient;
pub use proxy::GeocodingProxy;
pub use yahoo::{YahooClient, YahooEndpoint};

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("unexpected upstream response: {0}")]
    InvalidResponse(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Cache and pacing state for outbound geocoding calls.
///
/// Implementations may be shared across processes; the in-memory one is
/// per process.
pub trait GeocodeStore: Send + Sync {
    /// A cached value stored less than `ttl` ago
    fn get(&self, key: &str, ttl: Duration) -> Option<Value>;

    fn put(&self, key: &str, value: Value);

    /// Reserve the next outbound slot, spaced `min_interval` after the
    /// previous one. Returns how long the caller must wait before using it.
    fn should_throttle(&self, min_interval: Duration) -> Option<Duration>;
}

/// The remote geocoding service
#[async_trait]
pub trait GeocodeUpstream: Send + Sync {
    async fn search(&self, query: &str) -> Result<Value, GeocodeError>;

    async fn reverse(&self, lat: &str, lon: &str) -> Result<Value, GeocodeError>;
}
