//! Frequency statistics for token rarity
//!
//! Two running count tables (token → count, phonetic code → count) live in
//! the database and only ever grow. A batch works in two phases:
//!
//! 1. `FrequencyAggregator::update` counts every token of every description
//! 2. `FrequencyAggregator::snapshot` freezes the tables and their
//!    mean/standard deviation into a `StatisticsSnapshot`
//!
//! Every token in the batch is then tagged against that one snapshot, so
//! no two tokens of the same run see different baselines.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::db::Database;
use crate::error::Result;
use crate::extractor::tokenize;
use crate::oracles::PhoneticEncoder;

/// Frozen view of the count tables and their population statistics
#[derive(Debug, Clone, Default)]
pub struct StatisticsSnapshot {
    version: u64,
    word_counts: HashMap<String, u64>,
    phonetic_counts: HashMap<String, u64>,
    pub word_mean: f64,
    pub word_std: f64,
    pub phon_mean: f64,
    pub phon_std: f64,
}

impl StatisticsSnapshot {
    /// Compute statistics over the given tables
    pub fn from_counts(
        word_counts: HashMap<String, u64>,
        phonetic_counts: HashMap<String, u64>,
    ) -> Self {
        let (word_mean, word_std) = mean_std(word_counts.values());
        let (phon_mean, phon_std) = mean_std(phonetic_counts.values());
        let version = word_counts.values().sum();

        Self {
            version,
            word_counts,
            phonetic_counts,
            word_mean,
            word_std,
            phon_mean,
            phon_std,
        }
    }

    /// Total token observations behind this snapshot
    ///
    /// Counts never decrease, so a larger version is always a later state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Occurrences of a token, `None` if it was never counted
    pub fn word_count(&self, token: &str) -> Option<u64> {
        self.word_counts.get(token).copied()
    }

    /// Occurrences of a phonetic code, 0 if unseen
    pub fn phonetic_count(&self, code: &str) -> u64 {
        self.phonetic_counts.get(code).copied().unwrap_or(0)
    }

    pub fn distinct_words(&self) -> usize {
        self.word_counts.len()
    }

    pub fn distinct_phonetics(&self) -> usize {
        self.phonetic_counts.len()
    }

    /// `(count - word_mean) / word_std`
    pub fn word_z(&self, count: u64) -> f64 {
        z_score(count, self.word_mean, self.word_std)
    }

    /// `(count - phon_mean) / phon_std`
    pub fn phonetic_z(&self, count: u64) -> f64 {
        z_score(count, self.phon_mean, self.phon_std)
    }
}

/// A zero or undefined deviation (fewer than two entries, or all equal)
/// carries no rarity signal, so every count normalizes to 0.
fn z_score(count: u64, mean: f64, std: f64) -> f64 {
    if std.is_finite() && std > 0.0 {
        (count as f64 - mean) / std
    } else {
        0.0
    }
}

/// Mean and sample standard deviation (n - 1 denominator)
fn mean_std<'a>(values: impl Iterator<Item = &'a u64>) -> (f64, f64) {
    let values: Vec<f64> = values.map(|&v| v as f64).collect();
    let n = values.len();
    if n == 0 {
        return (0.0, f64::NAN);
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt())
}

/// Maintains the running count tables
pub struct FrequencyAggregator<'a> {
    db: &'a Database,
    phonetic: &'a dyn PhoneticEncoder,
}

impl<'a> FrequencyAggregator<'a> {
    pub fn new(db: &'a Database, phonetic: &'a dyn PhoneticEncoder) -> Self {
        Self { db, phonetic }
    }

    /// Count every token (and its phonetic code) of every description
    ///
    /// Returns the number of tokens counted.
    pub fn update<S: AsRef<str>>(&self, descriptions: &[S]) -> Result<usize> {
        let mut words = Vec::new();
        let mut codes = Vec::new();

        for description in descriptions {
            for token in tokenize(description.as_ref()) {
                if let Some(code) = self.phonetic.encode(&token).counted() {
                    codes.push(code.to_string());
                }
                words.push(token);
            }
        }

        self.db.increment_counts(&words, &codes)?;
        debug!(
            descriptions = descriptions.len(),
            tokens = words.len(),
            "Updated frequency tables"
        );
        Ok(words.len())
    }

    /// Freeze the current tables
    pub fn snapshot(&self) -> Result<StatisticsSnapshot> {
        let snapshot = StatisticsSnapshot::from_counts(
            self.db.load_word_counts()?,
            self.db.load_phonetic_counts()?,
        );
        info!(
            version = snapshot.version(),
            words = snapshot.distinct_words(),
            phonetics = snapshot.distinct_phonetics(),
            "Frequency statistics snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracles::DoubleMetaphoneEncoder;

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_mean_and_sample_std() {
        let snapshot = StatisticsSnapshot::from_counts(
            counts(&[("a", 1), ("b", 2), ("c", 3), ("d", 6)]),
            HashMap::new(),
        );
        assert!((snapshot.word_mean - 3.0).abs() < 1e-9);
        // sample variance = (4 + 1 + 0 + 9) / 3
        assert!((snapshot.word_std - (14.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(snapshot.version(), 12);
    }

    #[test]
    fn test_z_scores() {
        let snapshot = StatisticsSnapshot::from_counts(
            counts(&[("a", 1), ("b", 3)]),
            counts(&[("A", 2), ("B", 4)]),
        );
        let std = 2.0f64.sqrt();
        assert!((snapshot.word_z(3) - 1.0 / std).abs() < 1e-9);
        assert!((snapshot.word_z(1) + 1.0 / std).abs() < 1e-9);
        assert!((snapshot.phonetic_z(0) + 3.0 / std).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_std_normalizes_to_zero() {
        let single = StatisticsSnapshot::from_counts(counts(&[("a", 5)]), HashMap::new());
        assert_eq!(single.word_z(5), 0.0);
        assert_eq!(single.phonetic_z(0), 0.0);

        let flat = StatisticsSnapshot::from_counts(counts(&[("a", 2), ("b", 2)]), HashMap::new());
        assert_eq!(flat.word_z(7), 0.0);
    }

    #[test]
    fn test_lookups() {
        let snapshot =
            StatisticsSnapshot::from_counts(counts(&[("shop", 4)]), counts(&[("XP", 4)]));
        assert_eq!(snapshot.word_count("shop"), Some(4));
        assert_eq!(snapshot.word_count("unseen"), None);
        assert_eq!(snapshot.phonetic_count("XP"), 4);
        assert_eq!(snapshot.phonetic_count("ZZZ"), 0);
    }

    #[test]
    fn test_update_then_snapshot() {
        let db = Database::in_memory().unwrap();
        let encoder = DoubleMetaphoneEncoder::default();
        let aggregator = FrequencyAggregator::new(&db, &encoder);

        let counted = aggregator
            .update(&["BLUE BOTTLE COFFEE", "Blue Bottle #12"])
            .unwrap();
        assert_eq!(counted, 6);

        let snapshot = aggregator.snapshot().unwrap();
        assert_eq!(snapshot.word_count("blue"), Some(2));
        assert_eq!(snapshot.word_count("coffee"), Some(1));
        assert_eq!(snapshot.word_count("12"), Some(1));
        assert_eq!(snapshot.version(), 6);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let db = Database::in_memory().unwrap();
        let encoder = DoubleMetaphoneEncoder::default();
        let aggregator = FrequencyAggregator::new(&db, &encoder);

        aggregator.update(&["corner deli"]).unwrap();
        let before = aggregator.snapshot().unwrap();

        aggregator.update(&["corner deli", "corner store"]).unwrap();
        assert_eq!(before.word_count("corner"), Some(1));
        assert_eq!(before.word_count("store"), None);

        let after = aggregator.snapshot().unwrap();
        assert_eq!(after.word_count("corner"), Some(3));
        assert!(after.version() > before.version());
    }
}
