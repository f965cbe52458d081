//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An override file (explicit path, else ~/.local/share/geomerchant/config.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Keys missing from the override keep their built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geo::DistanceMetric;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/geomerchant.toml");

/// Token scoring parameters
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Minimum score for a token to join the predicted name
    pub inclusion_threshold: f64,
    /// Tokens always included regardless of score
    pub connectors: Vec<String>,
    /// Tokens of at least this many characters get the length bonus
    pub length_bonus_min_len: usize,
    /// Shortest prefix tested for embedded dictionary words
    pub embedded_prefix_min_len: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            inclusion_threshold: 3.0,
            connectors: vec!["&".to_string(), "and".to_string(), "the".to_string()],
            length_bonus_min_len: 6,
            embedded_prefix_min_len: 3,
        }
    }
}

/// Place-search boundary parameters
#[derive(Debug, Clone)]
pub struct PlaceSearchConfig {
    pub base_url: String,
    /// Search radius in the provider's native unit
    pub radius: u32,
    pub max_results: usize,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for PlaceSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/place/textsearch/json".to_string(),
            radius: 5000,
            max_results: 20,
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    /// Double Metaphone code length
    pub phonetic_code_len: usize,
    /// Votes needed to call two fingerprints derivatives
    pub vote_threshold: u32,
    pub distance: DistanceMetric,
    pub place_search: PlaceSearchConfig,
    /// Optional word list replacing the embedded dictionary
    pub dictionary_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            phonetic_code_len: 3,
            vote_threshold: 3,
            distance: DistanceMetric::Planar,
            place_search: PlaceSearchConfig::default(),
            dictionary_path: None,
        }
    }
}

impl EngineConfig {
    /// Load config, preferring `path`, then the default override location,
    /// then the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let override_path = path.map(Path::to_path_buf).or_else(default_config_path);

        let content = match override_path {
            Some(ref p) if p.exists() => fs::read_to_string(p).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", p.display(), e))
            })?,
            Some(ref p) if path.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )))
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("geomerchant").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    scoring: Option<RawScoring>,
    phonetic: Option<RawPhonetic>,
    clustering: Option<RawClustering>,
    geo: Option<RawGeo>,
    place_search: Option<RawPlaceSearch>,
    dictionary: Option<RawDictionary>,
}

#[derive(Debug, Deserialize)]
struct RawScoring {
    inclusion_threshold: Option<f64>,
    connectors: Option<Vec<String>>,
    length_bonus_min_len: Option<usize>,
    embedded_prefix_min_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawPhonetic {
    max_code_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawClustering {
    vote_threshold: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawGeo {
    distance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlaceSearch {
    base_url: Option<String>,
    radius: Option<u32>,
    max_results: Option<usize>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDictionary {
    path: Option<PathBuf>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(scoring) = raw.scoring {
        if let Some(threshold) = scoring.inclusion_threshold {
            config.scoring.inclusion_threshold = threshold;
        }
        if let Some(connectors) = scoring.connectors {
            config.scoring.connectors = connectors.into_iter().map(|c| c.to_lowercase()).collect();
        }
        if let Some(len) = scoring.length_bonus_min_len {
            config.scoring.length_bonus_min_len = len;
        }
        if let Some(len) = scoring.embedded_prefix_min_len {
            config.scoring.embedded_prefix_min_len = len;
        }
    }

    if let Some(len) = raw.phonetic.and_then(|p| p.max_code_len) {
        if len == 0 {
            return Err(Error::Config("phonetic.max_code_len must be positive".into()));
        }
        config.phonetic_code_len = len;
    }

    if let Some(threshold) = raw.clustering.and_then(|c| c.vote_threshold) {
        config.vote_threshold = threshold;
    }

    if let Some(distance) = raw.geo.and_then(|g| g.distance) {
        config.distance = distance.parse().map_err(Error::Config)?;
    }

    if let Some(search) = raw.place_search {
        if let Some(url) = search.base_url {
            config.place_search.base_url = url;
        }
        if let Some(radius) = search.radius {
            config.place_search.radius = radius;
        }
        if let Some(max) = search.max_results {
            config.place_search.max_results = max;
        }
        if let Some(timeout) = search.timeout_secs {
            config.place_search.timeout = Duration::from_secs(timeout);
        }
        if let Some(retries) = search.max_retries {
            config.place_search.max_retries = retries;
        }
    }

    config.dictionary_path = raw.dictionary.and_then(|d| d.path);

    Ok(config)
}
