//! Domain models for geomerchant

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A card transaction with its coarse location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    /// Approximate latitude, used to centre the place search
    pub latitude: f64,
    /// Approximate longitude, used to centre the place search
    pub longitude: f64,
}

/// A transaction parsed from CSV, not yet stored
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub import_hash: String,
}

/// A point the account holder was recorded at on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisitedLocation {
    pub lat: f64,
    pub lng: f64,
}

impl VisitedLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A visited location with its day, as imported
#[derive(Debug, Clone, Copy)]
pub struct NewVisitedLocation {
    pub date: NaiveDate,
    pub location: VisitedLocation,
}

/// A company with a known category that skips the place search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinedCompany {
    pub id: i64,
    /// Matched as a substring of the predicted company name
    pub name: String,
    /// Proper company name
    pub company: String,
    pub company_type: String,
}

/// A predefined company parsed from CSV, not yet stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewDefinedCompany {
    pub name: String,
    pub company: String,
    pub company_type: String,
}

/// A place returned by the place-search collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    /// Primary category (first of the provider's category list)
    pub place_type: Option<String>,
    pub address: Option<String>,
    pub place_id: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// What a predicted company name resolves to before geography is considered
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Nothing matched, or the search failed at the boundary
    NoCandidates,
    /// The name matched a predefined company; only its category is known
    Predefined(String),
    /// Places sharing the name near the transaction
    Candidates(Vec<PlaceCandidate>),
}

impl SearchOutcome {
    /// Wrap a search result, treating an empty list as no candidates
    pub fn from_candidates(candidates: Vec<PlaceCandidate>) -> Self {
        if candidates.is_empty() {
            Self::NoCandidates
        } else {
            Self::Candidates(candidates)
        }
    }

    pub fn candidate_count(&self) -> usize {
        match self {
            Self::NoCandidates => 0,
            Self::Predefined(_) => 1,
            Self::Candidates(c) => c.len(),
        }
    }
}

/// The place (or category) a transaction was matched to
///
/// Every field is blank when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub transaction_id: i64,
    pub place_name: Option<String>,
    pub company_type: Option<String>,
    pub address: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ResolvedRecord {
    pub fn blank(transaction_id: i64) -> Self {
        Self {
            transaction_id,
            place_name: None,
            company_type: None,
            address: None,
            place_id: None,
            lat: None,
            lng: None,
        }
    }

    pub fn category_only(transaction_id: i64, company_type: &str) -> Self {
        Self {
            company_type: Some(company_type.to_string()),
            ..Self::blank(transaction_id)
        }
    }

    pub fn from_candidate(transaction_id: i64, candidate: &PlaceCandidate) -> Self {
        Self {
            transaction_id,
            place_name: Some(candidate.name.clone()),
            company_type: candidate.place_type.clone(),
            address: candidate.address.clone(),
            place_id: candidate.place_id.clone(),
            lat: Some(candidate.lat),
            lng: Some(candidate.lng),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.place_name.is_none() && self.company_type.is_none()
    }
}

/// Identity signature of a predicted company name, one per distinct description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFingerprint {
    pub description: String,
    pub predicted_name: String,
    pub phonetic_primary: Option<String>,
    pub phonetic_alternate: Option<String>,
    /// First character of the predicted name, if any
    pub first_letter: Option<char>,
    /// Distinct characters of the first word of the predicted name
    pub letter_set: BTreeSet<char>,
}

impl CompanyFingerprint {
    /// Serialize the letter set for storage ("abc")
    pub fn letter_set_string(&self) -> String {
        self.letter_set.iter().collect()
    }

    /// Parse a stored letter set
    pub fn parse_letter_set(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }
}

/// Canonical name assigned to a fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralName {
    /// Fingerprint key (the original description)
    pub description: String,
    pub general_name: String,
}

/// Joined view of a transaction and everything derived from it
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTransaction {
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub predicted_name: Option<String>,
    pub general_name: Option<String>,
    pub place_name: Option<String>,
    pub company_type: Option<String>,
    pub address: Option<String>,
    pub resolved: bool,
}

/// Row counts for status output
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    pub transactions: i64,
    pub visited_locations: i64,
    pub defined_companies: i64,
    pub distinct_words: i64,
    pub distinct_phonetics: i64,
    pub fingerprints: i64,
    pub general_names: i64,
    pub resolved: i64,
}
