//! Google Places backend implementation
//!
//! HTTP client for the Places text search API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::PlaceSearchConfig;
use crate::error::{Error, Result};
use crate::models::PlaceCandidate;

use super::PlaceSearchBackend;

/// Google Places text search backend
#[derive(Clone)]
pub struct GooglePlacesBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    radius: u32,
    max_results: usize,
}

impl GooglePlacesBackend {
    /// Create a new backend; the config timeout applies to every request
    pub fn new(api_key: &str, config: &PlaceSearchConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_key: api_key.to_string(),
            radius: config.radius,
            max_results: config.max_results,
        })
    }

    /// Create from environment variables
    ///
    /// Returns `Ok(None)` if `GOOGLE_PLACES_API_KEY` is not set.
    pub fn from_env(config: &PlaceSearchConfig) -> Result<Option<Self>> {
        match std::env::var("GOOGLE_PLACES_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Some(Self::new(&key, config)?)),
            _ => Ok(None),
        }
    }
}

/// Response from the text search API
#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<TextSearchResult>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    name: String,
    #[serde(default)]
    types: Vec<String>,
    formatted_address: Option<String>,
    place_id: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Parse a text search response body into at most `max_results` candidates
///
/// A body without `results` is an empty result. Results without coordinates
/// cannot be ranked by distance and are dropped.
fn parse_text_search(body: &str, max_results: usize) -> Result<Vec<PlaceCandidate>> {
    let response: TextSearchResponse = serde_json::from_str(body)?;

    match response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(status) => {
            return Err(Error::PlaceSearch(format!(
                "{}: {}",
                status,
                response.error_message.unwrap_or_default()
            )))
        }
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(|r| {
            let location = r.geometry?.location;
            Some(PlaceCandidate {
                name: r.name,
                place_type: r.types.into_iter().next(),
                address: r.formatted_address,
                place_id: r.place_id,
                lat: location.lat,
                lng: location.lng,
            })
        })
        .take(max_results)
        .collect())
}

#[async_trait]
impl PlaceSearchBackend for GooglePlacesBackend {
    async fn search(&self, query: &str, lat: f64, lng: f64) -> Result<Vec<PlaceCandidate>> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("query", query.to_string()),
                ("location", format!("{},{}", lat, lng)),
                ("radius", self.radius.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let candidates = parse_text_search(&body, self.max_results)?;
        debug!(query, candidates = candidates.len(), "Google Places response");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "google"
    }
}
