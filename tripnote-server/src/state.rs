use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenKeys;
use crate::config::Settings;
use crate::db::Database;
use crate::geocoding::{
    GeocodeError, GeocodingProxy, InMemoryGeocodeStore, NominatimClient, YahooClient,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenKeys,
    pub geocoder: Arc<GeocodingProxy>,
    pub yahoo: YahooClient,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire up outbound clients and the in-memory geocode store from settings
    pub fn from_settings(db: Database, settings: &Settings) -> Result<Self, GeocodeError> {
        let geo = &settings.geocoding;
        let timeout = Duration::from_secs(geo.timeout_secs);

        let nominatim = NominatimClient::new(&geo.nominatim_url, &geo.user_agent, timeout)?;
        let geocoder = GeocodingProxy::new(
            Arc::new(InMemoryGeocodeStore::new()),
            Arc::new(nominatim),
            Duration::from_secs(geo.cache_ttl_secs),
            Duration::from_millis(geo.min_interval_ms),
        );
        let yahoo = YahooClient::new(&geo.yahoo_url, geo.yahoo_client_id.clone(), timeout)?;

        Ok(Self {
            db,
            tokens: TokenKeys::new(&settings.auth.jwt_secret, settings.auth.token_ttl_secs),
            geocoder: Arc::new(geocoder),
            yahoo,
            upload_dir: PathBuf::from(&settings.uploads.dir),
            max_upload_bytes: settings.uploads.max_bytes,
        })
    }
}
