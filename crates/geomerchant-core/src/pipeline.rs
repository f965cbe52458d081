//! Batch pipeline over stored transactions
//!
//! Three stages, each safe to re-run:
//!
//! 1. **parse**: count every new description, freeze one statistics snapshot,
//!    then extract and fingerprint each description against it
//! 2. **canonicalize**: cluster the whole fingerprint population and upsert
//!    one general name per fingerprint
//! 3. **resolve**: for each transaction without a resolved record, look the
//!    predicted name up (predefined company or place search) and pick the
//!    candidate nearest to where the account holder was that day

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cluster::Canonicalizer;
use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::extractor::{fingerprint, is_numeric_only, tokenize, CompanyNameExtractor, TokenDecision};
use crate::geo::GeoResolver;
use crate::models::{DefinedCompany, ResolvedRecord, SearchOutcome, Transaction};
use crate::oracles::Oracles;
use crate::places::PlaceSearchClient;
use crate::stats::FrequencyAggregator;

/// Result of a parse run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseSummary {
    /// Descriptions given to the run
    pub descriptions: usize,
    /// Purely numeric descriptions left out
    pub skipped_numeric: usize,
    pub tokens_counted: usize,
    pub fingerprints: usize,
    /// Version of the snapshot every name in the run was scored against
    pub snapshot_version: u64,
}

/// Result of a canonicalize run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalizeSummary {
    pub fingerprints: usize,
    /// Fingerprints with at least one derivative besides themselves
    pub clustered: usize,
}

/// Result of a resolve run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveSummary {
    pub processed: usize,
    /// Matched to a place candidate
    pub placed: usize,
    /// Matched to a predefined company's category
    pub predefined: usize,
    /// Nothing found, blank record written
    pub blank: usize,
    /// Candidates found but no visited locations that day; nothing written
    pub failed: usize,
}

/// Per-token breakdown of one description
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub description: String,
    pub numeric_only: bool,
    pub predicted_name: Option<String>,
    pub decisions: Vec<TokenDecision>,
    /// Inclusion threshold the scores were compared against
    pub threshold: f64,
    pub snapshot_version: u64,
}

/// Runs the batch stages against one database
pub struct MerchantPipeline {
    db: Database,
    oracles: Oracles,
    config: EngineConfig,
}

impl MerchantPipeline {
    pub fn new(db: Database, oracles: Oracles, config: EngineConfig) -> Self {
        Self {
            db,
            oracles,
            config,
        }
    }

    /// Build with the default oracles for `config`
    pub fn from_config(db: Database, config: EngineConfig) -> Result<Self> {
        let oracles = Oracles::from_config(&config)?;
        Ok(Self::new(db, oracles, config))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a batch of descriptions into fingerprints
    ///
    /// Every description is counted before any is scored, and the whole
    /// batch is scored against a single snapshot.
    pub fn parse_descriptions<S: AsRef<str>>(&self, descriptions: &[S]) -> Result<ParseSummary> {
        let batch: Vec<&str> = descriptions
            .iter()
            .map(|d| d.as_ref())
            .filter(|d| !is_numeric_only(d))
            .collect();
        let skipped_numeric = descriptions.len() - batch.len();

        let aggregator = FrequencyAggregator::new(&self.db, self.oracles.phonetic.as_ref());
        let tokens_counted = aggregator.update(&batch)?;
        let stats = aggregator.snapshot()?;

        let extractor = CompanyNameExtractor::new(&self.oracles, &self.config.scoring);
        for description in &batch {
            let name = extractor.extract(description, &stats)?;
            let fp = fingerprint(description, &name, self.oracles.phonetic.as_ref());
            self.db.upsert_fingerprint(&fp)?;
        }

        let summary = ParseSummary {
            descriptions: descriptions.len(),
            skipped_numeric,
            tokens_counted,
            fingerprints: batch.len(),
            snapshot_version: stats.version(),
        };
        info!(
            descriptions = summary.descriptions,
            skipped = summary.skipped_numeric,
            fingerprints = summary.fingerprints,
            "Parsed descriptions"
        );
        Ok(summary)
    }

    /// Parse the distinct transaction descriptions not yet fingerprinted
    pub fn parse_new_transactions(&self) -> Result<ParseSummary> {
        let descriptions = self.db.list_unparsed_descriptions()?;
        if descriptions.is_empty() {
            debug!("No new descriptions to parse");
            return Ok(ParseSummary::default());
        }
        self.parse_descriptions(&descriptions)
    }

    /// Assign a general name to every fingerprint
    pub fn canonicalize(&self) -> Result<CanonicalizeSummary> {
        let population = self.db.list_fingerprints()?;
        let assignments = Canonicalizer::new(self.config.vote_threshold).canonicalize(&population);

        for assignment in &assignments {
            self.db.upsert_general_name(&assignment.into())?;
        }

        Ok(CanonicalizeSummary {
            fingerprints: assignments.len(),
            clustered: assignments
                .iter()
                .filter(|a| a.derivatives.len() > 1)
                .count(),
        })
    }

    /// Resolve every transaction that has no resolved record yet
    ///
    /// A transaction whose candidates cannot be ranked (no visited locations
    /// that day) is logged and skipped; the rest of the batch continues.
    pub async fn resolve_transactions(&self, search: &PlaceSearchClient) -> Result<ResolveSummary> {
        let transactions = self.db.list_unresolved_transactions()?;
        let companies = self.db.list_defined_companies()?;
        let resolver = GeoResolver::new(self.config.distance);
        let mut summary = ResolveSummary::default();

        for tx in &transactions {
            summary.processed += 1;

            let predicted = self
                .db
                .get_fingerprint(&tx.description)?
                .map(|fp| fp.predicted_name);
            let outcome = self
                .lookup(predicted.as_deref(), tx, &companies, search)
                .await;
            let visited = self.db.visited_locations_on(tx.date)?;

            let record = match resolver.resolve(tx.id, tx.date, &visited, &outcome) {
                Ok(record) => record,
                Err(Error::NoVisitedLocations(date)) => {
                    error!(
                        transaction_id = tx.id,
                        %date,
                        candidates = outcome.candidate_count(),
                        "No visited locations for day, transaction left unresolved"
                    );
                    summary.failed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match outcome {
                SearchOutcome::NoCandidates => summary.blank += 1,
                SearchOutcome::Predefined(_) => summary.predefined += 1,
                SearchOutcome::Candidates(_) => summary.placed += 1,
            }
            self.write_resolved(&record)?;
        }

        info!(
            processed = summary.processed,
            placed = summary.placed,
            predefined = summary.predefined,
            blank = summary.blank,
            failed = summary.failed,
            "Resolved transactions"
        );
        Ok(summary)
    }

    /// What a predicted name resolves to before geography is considered
    async fn lookup(
        &self,
        predicted: Option<&str>,
        tx: &Transaction,
        companies: &[DefinedCompany],
        search: &PlaceSearchClient,
    ) -> SearchOutcome {
        let name = match predicted {
            Some(n) if !n.trim().is_empty() => n,
            _ => return SearchOutcome::NoCandidates,
        };

        if let Some(company_type) = predefined_type(companies, name) {
            debug!(transaction_id = tx.id, name, company_type = %company_type, "Predefined company");
            return SearchOutcome::Predefined(company_type);
        }

        let query = tokenize(name).join(" ");
        if query.is_empty() {
            return SearchOutcome::NoCandidates;
        }

        let candidates = search
            .lookup(
                &query,
                tx.latitude,
                tx.longitude,
                self.config.place_search.max_retries,
            )
            .await;
        SearchOutcome::from_candidates(candidates)
    }

    fn write_resolved(&self, record: &ResolvedRecord) -> Result<()> {
        if !self.db.insert_resolved(record)? {
            warn!(
                transaction_id = record.transaction_id,
                "Transaction already resolved, keeping existing record"
            );
        }
        Ok(())
    }

    /// Explain how a description is scored against the current counts
    ///
    /// Nothing is counted: every token must already have been seen.
    pub fn explain(&self, description: &str) -> Result<Explanation> {
        let stats = FrequencyAggregator::new(&self.db, self.oracles.phonetic.as_ref()).snapshot()?;
        let extractor = CompanyNameExtractor::new(&self.oracles, &self.config.scoring);

        if is_numeric_only(description) {
            return Ok(Explanation {
                description: description.to_string(),
                numeric_only: true,
                predicted_name: None,
                decisions: Vec::new(),
                threshold: extractor.threshold(),
                snapshot_version: stats.version(),
            });
        }

        let decisions = if tokenize(description).len() > 1 {
            extractor.explain(description, &stats)?
        } else {
            Vec::new()
        };
        let predicted_name = extractor.extract(description, &stats)?;

        Ok(Explanation {
            description: description.to_string(),
            numeric_only: false,
            predicted_name: Some(predicted_name),
            decisions,
            threshold: extractor.threshold(),
            snapshot_version: stats.version(),
        })
    }
}

/// Category of the last predefined company whose name occurs in `predicted`
fn predefined_type(companies: &[DefinedCompany], predicted: &str) -> Option<String> {
    let predicted = predicted.to_lowercase();
    companies
        .iter()
        .filter(|c| !c.name.is_empty() && !c.company_type.is_empty())
        .filter(|c| predicted.contains(c.name.as_str()))
        .last()
        .map(|c| c.company_type.clone())
}
