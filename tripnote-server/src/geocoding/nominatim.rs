use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{GeocodeError, GeocodeUpstream};

/// OpenStreetMap Nominatim over HTTP. One attempt per call, no retries.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, GeocodeError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl GeocodeUpstream for NominatimClient {
    async fn search(&self, query: &str) -> Result<Value, GeocodeError> {
        self.get_json(
            "search",
            &[("q", query), ("format", "json"), ("addressdetails", "1"), ("limit", "5")],
        )
        .await
    }

    async fn reverse(&self, lat: &str, lon: &str) -> Result<Value, GeocodeError> {
        self.get_json(
            "reverse",
            &[("lat", lat), ("lon", lon), ("format", "json"), ("addressdetails", "1")],
        )
        .await
    }
}
