use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Development fallback; a warning is logged when it is in use
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geocoding {
    pub nominatim_url: String,
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
    pub yahoo_url: String,
    #[serde(default)]
    pub yahoo_client_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Uploads {
    pub dir: String,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub geocoding: Geocoding,
    pub uploads: Uploads,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional for deployment)
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in tripnote-server directory (for development)
        let dev_path = PathBuf::from("tripnote-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "tripnote.db")?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_ttl_secs", 86_400)?
            .set_default("geocoding.nominatim_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoding.user_agent", "Tripnote/0.1")?
            .set_default("geocoding.cache_ttl_secs", 3_600)?
            .set_default("geocoding.min_interval_ms", 1_000)?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default("geocoding.yahoo_url", "https://map.yahooapis.jp")?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.max_bytes", 5 * 1024 * 1024)?;

        // 2. Override with environment variables (highest priority)
        let overrides = [
            ("DATABASE_PATH", "database.path"),
            ("PORT", "server.port"),
            ("HOST", "server.host"),
            ("JWT_SECRET", "auth.jwt_secret"),
            ("YAHOO_CLIENT_ID", "geocoding.yahoo_client_id"),
            ("NOMINATIM_URL", "geocoding.nominatim_url"),
            ("UPLOAD_DIR", "uploads.dir"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
