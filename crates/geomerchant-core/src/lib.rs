//! Geomerchant Core Library
//!
//! Merchant name extraction and place resolution for card transactions:
//! - Frequency statistics over description tokens
//! - Word feature tagging and name likelihood scoring
//! - Company name extraction and fingerprinting
//! - Clustering of predicted names into general names
//! - Geo-distance resolution of place-search candidates
//! - Pluggable place-search backends (Google Places, mock)
//! - Database access and migrations
//! - CSV import for transactions, visited locations and predefined companies

pub mod cluster;
pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod geo;
pub mod import;
pub mod models;
pub mod oracles;
pub mod pipeline;
pub mod places;
pub mod scorer;
pub mod stats;
pub mod tagger;

pub use cluster::{Canonicalizer, ClusterAssignment};
pub use config::{EngineConfig, PlaceSearchConfig, ScoringConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use extractor::{fingerprint, is_numeric_only, tokenize, CompanyNameExtractor, TokenDecision};
pub use geo::{DistanceMetric, GeoResolver};
pub use oracles::{
    Dictionary, DoubleMetaphoneEncoder, Oracles, PhoneticCodes, PhoneticEncoder, PosTagger,
    SuffixTagger, WordList,
};
pub use pipeline::{
    CanonicalizeSummary, Explanation, MerchantPipeline, ParseSummary, ResolveSummary,
};
pub use places::{GooglePlacesBackend, MockPlaceSearch, PlaceSearchBackend, PlaceSearchClient};
pub use scorer::NameScorer;
pub use stats::{FrequencyAggregator, StatisticsSnapshot};
pub use tagger::{Feature, FeatureKind, FeatureValue, FeatureVector, WordTagger};
