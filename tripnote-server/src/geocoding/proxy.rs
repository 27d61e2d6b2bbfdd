use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{GeocodeError, GeocodeStore, GeocodeUpstream};

enum Lookup<'a> {
    Search(&'a str),
    Reverse { lat: &'a str, lon: &'a str },
}

impl Lookup<'_> {
    fn cache_key(&self) -> String {
        match self {
            Lookup::Search(query) => (*query).to_string(),
            Lookup::Reverse { lat, lon } => format!("REV:{lat},{lon}"),
        }
    }
}

/// Caches identical lookups and paces outbound calls globally
#[derive(Clone)]
pub struct GeocodingProxy {
    store: Arc<dyn GeocodeStore>,
    upstream: Arc<dyn GeocodeUpstream>,
    ttl: Duration,
    min_interval: Duration,
}

impl GeocodingProxy {
    pub fn new(
        store: Arc<dyn GeocodeStore>,
        upstream: Arc<dyn GeocodeUpstream>,
        ttl: Duration,
        min_interval: Duration,
    ) -> Self {
        Self {
            store,
            upstream,
            ttl,
            min_interval,
        }
    }

    /// Forward geocoding, cached under the exact query string
    pub async fn search(&self, query: &str) -> Result<Value, GeocodeError> {
        self.lookup(Lookup::Search(query)).await
    }

    /// Reverse geocoding, cached under `REV:<lat>,<lon>` without rounding
    pub async fn reverse(&self, lat: &str, lon: &str) -> Result<Value, GeocodeError> {
        self.lookup(Lookup::Reverse { lat, lon }).await
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> Result<Value, GeocodeError> {
        let key = lookup.cache_key();
        if let Some(hit) = self.store.get(&key, self.ttl) {
            tracing::debug!(key = %key, "geocode cache hit");
            return Ok(hit);
        }

        // The slot is consumed even if the call below fails
        if let Some(wait) = self.store.should_throttle(self.min_interval) {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "throttling geocode call");
            tokio::time::sleep(wait).await;
        }

        let value = match lookup {
            Lookup::Search(query) => self.upstream.search(query).await?,
            Lookup::Reverse { lat, lon } => self.upstream.reverse(lat, lon).await?,
        };
        self.store.put(&key, value.clone());
        Ok(value)
    }
}
