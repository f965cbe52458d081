//! Place search backends
//!
//! Finds real places matching a predicted company name near the approximate
//! location of a transaction.
//!
//! # Architecture
//!
//! - `PlaceSearchBackend` trait: one text search per call
//! - `PlaceSearchClient` enum: concrete wrapper with Clone + compile-time dispatch
//! - Backend implementations: `GooglePlacesBackend`, `MockPlaceSearch`
//!
//! # Configuration
//!
//! Environment variables:
//! - `PLACE_SEARCH_BACKEND`: Backend to use (google, mock). Default: google
//! - `GOOGLE_PLACES_API_KEY`: API key (required for google backend)
//!
//! Radius, result limit, timeout and retries come from `[place_search]` in
//! the engine config.

mod google;
mod mock;

pub use google::GooglePlacesBackend;
pub use mock::MockPlaceSearch;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::PlaceSearchConfig;
use crate::error::Result;
use crate::models::PlaceCandidate;

/// Trait defining the interface for all place search backends
#[async_trait]
pub trait PlaceSearchBackend: Send + Sync {
    /// Places matching `query` around (`lat`, `lng`), best match first
    async fn search(&self, query: &str, lat: f64, lng: f64) -> Result<Vec<PlaceCandidate>>;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}

/// Concrete place search client enum
#[derive(Clone)]
pub enum PlaceSearchClient {
    /// Google Places text search (HTTP API)
    Google(GooglePlacesBackend),
    /// Canned results for testing
    Mock(MockPlaceSearch),
}

impl PlaceSearchClient {
    /// Create a client from environment variables
    ///
    /// Checks `PLACE_SEARCH_BACKEND` to determine which backend to use:
    /// - `google` (default): Uses GOOGLE_PLACES_API_KEY
    /// - `mock`: Creates an empty mock backend (every search finds nothing)
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env(config: &PlaceSearchConfig) -> Result<Option<Self>> {
        let backend =
            std::env::var("PLACE_SEARCH_BACKEND").unwrap_or_else(|_| "google".to_string());

        match backend.to_lowercase().as_str() {
            "mock" => Ok(Some(Self::Mock(MockPlaceSearch::new()))),
            "google" => Ok(GooglePlacesBackend::from_env(config)?.map(Self::Google)),
            _ => {
                warn!(backend = %backend, "Unknown PLACE_SEARCH_BACKEND, falling back to google");
                Ok(GooglePlacesBackend::from_env(config)?.map(Self::Google))
            }
        }
    }

    /// Create a mock client for testing
    pub fn mock(mock: MockPlaceSearch) -> Self {
        Self::Mock(mock)
    }

    /// Search with the boundary policy applied
    ///
    /// Failed attempts are retried up to `max_retries` times. If every
    /// attempt fails the search counts as finding nothing.
    pub async fn lookup(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        max_retries: u32,
    ) -> Vec<PlaceCandidate> {
        let mut attempt = 0;
        loop {
            match self.search(query, lat, lng).await {
                Ok(candidates) => {
                    debug!(
                        backend = self.name(),
                        query,
                        candidates = candidates.len(),
                        "Place search"
                    );
                    return candidates;
                }
                Err(e) if attempt < max_retries => {
                    attempt += 1;
                    debug!(backend = self.name(), query, attempt, error = %e, "Retrying place search");
                }
                Err(e) => {
                    warn!(
                        backend = self.name(),
                        query,
                        attempts = attempt + 1,
                        error = %e,
                        "Place search failed, treating as no candidates"
                    );
                    return Vec::new();
                }
            }
        }
    }
}

#[async_trait]
impl PlaceSearchBackend for PlaceSearchClient {
    async fn search(&self, query: &str, lat: f64, lng: f64) -> Result<Vec<PlaceCandidate>> {
        match self {
            PlaceSearchClient::Google(b) => b.search(query, lat, lng).await,
            PlaceSearchClient::Mock(b) => b.search(query, lat, lng).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            PlaceSearchClient::Google(b) => b.name(),
            PlaceSearchClient::Mock(b) => b.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str) -> PlaceCandidate {
        PlaceCandidate {
            name: name.to_string(),
            place_type: Some("cafe".into()),
            address: None,
            place_id: None,
            lat: 1.0,
            lng: 2.0,
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_results() {
        let mock = MockPlaceSearch::new().with_results("blue bottle", vec![place("Blue Bottle")]);
        let client = PlaceSearchClient::mock(mock.clone());

        let found = client.lookup("blue bottle", 0.0, 0.0, 2).await;
        assert_eq!(found.len(), 1);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_retries_then_gives_up() {
        let mock = MockPlaceSearch::failing();
        let client = PlaceSearchClient::mock(mock.clone());

        let found = client.lookup("anything", 0.0, 0.0, 2).await;
        assert!(found.is_empty());
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_lookup_without_retries() {
        let mock = MockPlaceSearch::failing();
        let client = PlaceSearchClient::mock(mock.clone());

        assert!(client.lookup("anything", 0.0, 0.0, 0).await.is_empty());
        assert_eq!(mock.call_count(), 1);
    }
}
