//! Mock backend for testing
//!
//! Returns canned candidates per query. Useful for unit tests and
//! development without network access or an API key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::PlaceCandidate;

use super::PlaceSearchBackend;

/// Mock place search backend
///
/// Queries are matched case-insensitively; unknown queries find nothing.
/// Clones share one call counter.
#[derive(Clone, Default)]
pub struct MockPlaceSearch {
    results: HashMap<String, Vec<PlaceCandidate>>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockPlaceSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every search fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Register the candidates returned for `query`
    pub fn with_results(mut self, query: &str, candidates: Vec<PlaceCandidate>) -> Self {
        self.results.insert(query.to_lowercase(), candidates);
        self
    }

    /// Number of searches made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceSearchBackend for MockPlaceSearch {
    async fn search(&self, query: &str, _lat: f64, _lng: f64) -> Result<Vec<PlaceCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::PlaceSearch("mock backend configured to fail".into()));
        }
        Ok(self
            .results
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
