use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use super::GeocodeStore;

#[derive(Default)]
struct State {
    entries: HashMap<String, (Instant, Value)>,
    last_call: Option<Instant>,
}

/// Process-local cache and throttle. Entries are never evicted, only
/// replaced once stale.
#[derive(Clone, Default)]
pub struct InMemoryGeocodeStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryGeocodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the map half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GeocodeStore for InMemoryGeocodeStore {
    fn get(&self, key: &str, ttl: Duration) -> Option<Value> {
        let state = self.lock();
        state
            .entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < ttl)
            .map(|(_, value)| value.clone())
    }

    fn put(&self, key: &str, value: Value) {
        let mut state = self.lock();
        state.entries.insert(key.to_string(), (Instant::now(), value));
    }

    fn should_throttle(&self, min_interval: Duration) -> Option<Duration> {
        let mut state = self.lock();
        let now = Instant::now();
        let slot = match state.last_call {
            Some(previous) => (previous + min_interval).max(now),
            None => now,
        };
        state.last_call = Some(slot);
        (slot > now).then(|| slot - now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let store = InMemoryGeocodeStore::new();
        let ttl = Duration::from_secs(3600);
        store.put("Kyoto", json!([{"lat": "35.0"}]));

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(store.get("Kyoto", ttl), Some(json!([{"lat": "35.0"}])));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("Kyoto", ttl), None);
        assert_eq!(store.get("kyoto", ttl), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_reserves_spaced_slots() {
        let store = InMemoryGeocodeStore::new();
        let interval = Duration::from_millis(1000);

        assert_eq!(store.should_throttle(interval), None);
        assert_eq!(store.should_throttle(interval), Some(Duration::from_millis(1000)));
        assert_eq!(store.should_throttle(interval), Some(Duration::from_millis(2000)));

        tokio::time::advance(Duration::from_millis(5000)).await;
        assert_eq!(store.should_throttle(interval), None);

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(store.should_throttle(interval), Some(Duration::from_millis(600)));
    }
}
