use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use tripnote_types::PlaceSuggestion;

use super::GeocodeError;

/// Yahoo! Open Local Platform APIs reachable through the passthrough routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YahooEndpoint {
    LocalSearch,
    Geocoder,
    ReverseGeocoder,
    PlaceInfo,
}

impl YahooEndpoint {
    fn path(self) -> &'static str {
        match self {
            YahooEndpoint::LocalSearch => "search/local/V1/localSearch",
            YahooEndpoint::Geocoder => "geocode/V1/geoCoder",
            YahooEndpoint::ReverseGeocoder => "geoapi/V1/reverseGeoCoder",
            YahooEndpoint::PlaceInfo => "placeinfo/V1/get",
        }
    }
}

/// Uncached client; every call needs the application id
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalSearchResponse {
    #[serde(rename = "Feature", default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Property", default)]
    property: Option<FeatureProperty>,
    #[serde(rename = "Geometry")]
    geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperty {
    #[serde(rename = "Address")]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    #[serde(rename = "Coordinates")]
    coordinates: String,
}

/// Parse Yahoo's `"lon,lat"` coordinate string
fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lon, lat) = raw.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

/// Convert a local search payload into place suggestions, skipping
/// features without usable coordinates
pub fn suggestions_from(payload: Value) -> Result<Vec<PlaceSuggestion>, GeocodeError> {
    let parsed: LocalSearchResponse = serde_json::from_value(payload)
        .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    Ok(parsed
        .features
        .into_iter()
        .filter_map(|feature| {
            let (lat, lon) = parse_coordinates(&feature.geometry?.coordinates)?;
            Some(PlaceSuggestion {
                name: feature.name,
                address: feature.property.and_then(|p| p.address),
                lat,
                lon,
            })
        })
        .collect())
}

impl YahooClient {
    pub fn new(base_url: &str, app_id: Option<String>, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.filter(|id| !id.is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.app_id.is_some()
    }

    /// Call an endpoint with `appid` and `output=json` plus the given params.
    /// Caller params come last so they can override the defaults.
    pub async fn fetch(
        &self,
        endpoint: YahooEndpoint,
        params: &[(String, String)],
    ) -> Result<Value, GeocodeError> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or(GeocodeError::NotConfigured("YAHOO_CLIENT_ID"))?;

        let mut query: Vec<(&str, &str)> = vec![("appid", app_id), ("output", "json")];
        for (key, value) in params {
            query.retain(|(existing, _)| *existing != key.as_str());
            query.push((key.as_str(), value.as_str()));
        }

        let url = format!("{}/{}", self.base_url, endpoint.path());
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }

    /// Local search reduced to `{name, address, lat, lon}` entries
    pub async fn local_suggestions(&self, query: &str) -> Result<Vec<PlaceSuggestion>, GeocodeError> {
        let payload = self
            .fetch(
                YahooEndpoint::LocalSearch,
                &[("query".to_string(), query.to_string())],
            )
            .await?;
        suggestions_from(payload)
    }
}
