//! Company name extraction from transaction descriptions
//!
//! A description like `"SQ *BLUE BOTTLE COFFEE 1234 OAKLAND CA"` is split
//! into lowercase tokens; each token is tagged and scored, and the tokens
//! that clear the inclusion threshold (plus connectors such as `&`) are
//! joined back, in order, into the predicted company name.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::models::CompanyFingerprint;
use crate::oracles::{Oracles, PhoneticEncoder};
use crate::scorer::NameScorer;
use crate::stats::StatisticsSnapshot;
use crate::tagger::{FeatureVector, WordTagger};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w&]+").expect("valid regex"));
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Split a description into lowercase word tokens (`&` counts as a word)
pub fn tokenize(description: &str) -> Vec<String> {
    let lower = description.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A description that is nothing but a number (e.g. a bare reference code)
///
/// Such descriptions carry no name and are filtered out before extraction.
pub fn is_numeric_only(description: &str) -> bool {
    match DIGITS_RE.find(description) {
        Some(m) => m.as_str() == description,
        None => false,
    }
}

/// How one token of a description was judged
#[derive(Debug, Clone, Serialize)]
pub struct TokenDecision {
    pub token: String,
    pub connector: bool,
    /// Absent for connectors, which are never scored
    pub features: Option<FeatureVector>,
    pub score: Option<f64>,
    pub included: bool,
}

/// Builds predicted company names from descriptions
pub struct CompanyNameExtractor<'a> {
    oracles: &'a Oracles,
    config: &'a ScoringConfig,
    scorer: NameScorer,
}

impl<'a> CompanyNameExtractor<'a> {
    pub fn new(oracles: &'a Oracles, config: &'a ScoringConfig) -> Self {
        Self {
            oracles,
            config,
            scorer: NameScorer::new(config.inclusion_threshold),
        }
    }

    /// Score a token must reach to be kept
    pub fn threshold(&self) -> f64 {
        self.scorer.threshold()
    }

    /// Predict the company name of one description
    ///
    /// A single-token description is its own name and is returned as given.
    /// Every token must already be counted in `stats`.
    pub fn extract(&self, description: &str, stats: &StatisticsSnapshot) -> Result<String> {
        let tokens = tokenize(description);
        if tokens.len() == 1 {
            return Ok(description.to_string());
        }

        let decisions = self.decide(&tokens, stats)?;
        let name = decisions
            .into_iter()
            .filter(|d| d.included)
            .map(|d| d.token)
            .collect::<Vec<_>>()
            .join(" ");

        debug!(description, name = %name, "Extracted company name");
        Ok(name)
    }

    /// Per-token decisions for a description, for inspection
    ///
    /// Connector decisions carry no features or score.
    pub fn explain(
        &self,
        description: &str,
        stats: &StatisticsSnapshot,
    ) -> Result<Vec<TokenDecision>> {
        self.decide(&tokenize(description), stats)
    }

    /// Connectors are included without being tagged, so they are never
    /// checked against the counts and cannot raise `UnknownToken`.
    fn decide(&self, tokens: &[String], stats: &StatisticsSnapshot) -> Result<Vec<TokenDecision>> {
        let tagger = WordTagger::new(self.oracles, self.config);

        tokens
            .iter()
            .map(|token| {
                if self.is_connector(token) {
                    return Ok(TokenDecision {
                        token: token.clone(),
                        connector: true,
                        features: None,
                        score: None,
                        included: true,
                    });
                }

                let features = tagger.tag(token, stats)?;
                let score = self.scorer.score(&features);
                Ok(TokenDecision {
                    token: token.clone(),
                    connector: false,
                    features: Some(features),
                    score: Some(score),
                    included: self.scorer.includes(score),
                })
            })
            .collect()
    }

    fn is_connector(&self, token: &str) -> bool {
        self.config.connectors.iter().any(|c| c == token)
    }
}

/// Identity signature of a predicted name
///
/// Built from the tokenized name, so punctuation kept in a verbatim
/// single-token name does not reach the letters. Phonetic codes cover the
/// whole name; the letter set covers only its first word.
pub fn fingerprint(
    description: &str,
    predicted_name: &str,
    phonetic: &dyn PhoneticEncoder,
) -> CompanyFingerprint {
    let tokens = tokenize(predicted_name);
    let codes = phonetic.encode(&tokens.join(" "));

    let first_word = tokens.first().map(String::as_str).unwrap_or_default();
    let letter_set: BTreeSet<char> = first_word.chars().filter(|c| c.is_alphanumeric()).collect();

    CompanyFingerprint {
        description: description.to_string(),
        predicted_name: predicted_name.to_string(),
        phonetic_primary: codes.primary,
        phonetic_alternate: codes.alternate,
        first_letter: first_word.chars().next(),
        letter_set,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::oracles::{DoubleMetaphoneEncoder, SuffixTagger, WordList};

    fn oracles() -> Oracles {
        Oracles::new(
            WordList::from_words(["blue", "bottle", "coffee", "the", "oak", "land"]),
            DoubleMetaphoneEncoder::default(),
            SuffixTagger,
        )
    }

    fn snapshot(words: &[(&str, u64)]) -> StatisticsSnapshot {
        let encoder = DoubleMetaphoneEncoder::default();
        let mut phon: HashMap<String, u64> = HashMap::new();
        for (word, count) in words {
            if let Some(code) = encoder.encode(word).counted() {
                *phon.entry(code.to_string()).or_default() += count;
            }
        }
        StatisticsSnapshot::from_counts(
            words.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            phon,
        )
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("SQ *BLUE BOTTLE Coffee #12"),
            vec!["sq", "blue", "bottle", "coffee", "12"]
        );
        assert_eq!(tokenize("Barnes & Noble"), vec!["barnes", "&", "noble"]);
        assert_eq!(tokenize("AT&T"), vec!["at&t"]);
        assert!(tokenize("  *** ").is_empty());
    }

    #[test]
    fn test_is_numeric_only() {
        assert!(is_numeric_only("123456"));
        assert!(!is_numeric_only("123 456"));
        assert!(!is_numeric_only("7-eleven"));
        assert!(!is_numeric_only("coffee"));
        assert!(!is_numeric_only(""));
    }

    #[test]
    fn test_single_token_returned_verbatim() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let extractor = CompanyNameExtractor::new(&oracles, &config);

        // Not even counted: scoring is skipped entirely
        let stats = snapshot(&[]);
        assert_eq!(extractor.extract("Starbucks", &stats).unwrap(), "Starbucks");
        assert_eq!(extractor.extract("  QDOBA* ", &stats).unwrap(), "  QDOBA* ");
    }

    #[test]
    fn test_connector_always_included() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let extractor = CompanyNameExtractor::new(&oracles, &config);
        let stats = snapshot(&[("the", 4), ("xyz123", 1), ("coffee", 2), ("shop", 3)]);

        let decisions = extractor.explain("the xyz123", &stats).unwrap();
        let xyz = decisions.iter().find(|d| d.token == "xyz123").unwrap();
        assert!(xyz.score.unwrap() < 3.0);
        assert!(!xyz.included);

        let name = extractor.extract("the xyz123", &stats).unwrap();
        assert_eq!(name, "the");
    }

    #[test]
    fn test_extract_keeps_order_and_drops_noise() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let extractor = CompanyNameExtractor::new(&oracles, &config);
        let stats = snapshot(&[
            ("blue", 1),
            ("bottle", 1),
            ("coffee", 1),
            ("1234", 9),
            ("oakland", 1),
            ("sq", 9),
        ]);

        let decisions = extractor
            .explain("SQ BLUE BOTTLE COFFEE 1234", &stats)
            .unwrap();
        assert_eq!(decisions.len(), 5);
        for d in &decisions {
            assert!(!d.connector);
            assert_eq!(d.included, d.score.unwrap() >= 3.0, "{}", d.token);
        }

        let expected: Vec<&str> = decisions
            .iter()
            .filter(|d| d.included)
            .map(|d| d.token.as_str())
            .collect();
        let name = extractor
            .extract("SQ BLUE BOTTLE COFFEE 1234", &stats)
            .unwrap();
        assert_eq!(name, expected.join(" "));
        assert!(name.contains("bottle"));
        assert!(name.contains("coffee"));
        assert!(!name.contains("1234"));
    }

    #[test]
    fn test_unknown_token_fails() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let extractor = CompanyNameExtractor::new(&oracles, &config);
        let stats = snapshot(&[("blue", 1)]);

        assert!(extractor.extract("blue bottle", &stats).is_err());
    }

    #[test]
    fn test_fingerprint() {
        let encoder = DoubleMetaphoneEncoder::default();
        let fp = fingerprint("SQ *BLUE BOTTLE", "blue bottle", &encoder);

        assert_eq!(fp.description, "SQ *BLUE BOTTLE");
        assert_eq!(fp.predicted_name, "blue bottle");
        assert_eq!(fp.first_letter, Some('b'));
        assert_eq!(fp.letter_set_string(), "belu");
        assert_eq!(fp.phonetic_primary, encoder.encode("blue bottle").primary);
    }

    #[test]
    fn test_fingerprint_of_empty_name() {
        let encoder = DoubleMetaphoneEncoder::default();
        let fp = fingerprint("12 34 5", "", &encoder);

        assert_eq!(fp.first_letter, None);
        assert!(fp.letter_set.is_empty());
        assert_eq!(fp.phonetic_primary, None);
    }

    #[test]
    fn test_fingerprint_lowercases_verbatim_name() {
        let encoder = DoubleMetaphoneEncoder::default();
        let fp = fingerprint("Starbucks", "Starbucks", &encoder);
        assert_eq!(fp.first_letter, Some('s'));
        assert!(fp.letter_set.contains(&'s'));
        assert!(!fp.letter_set.contains(&'S'));
    }

    #[test]
    fn test_fingerprint_ignores_leading_punctuation() {
        let encoder = DoubleMetaphoneEncoder::default();
        let starred = fingerprint("*STARBUCKS", "*STARBUCKS", &encoder);
        let plain = fingerprint("STARBUCKS", "STARBUCKS", &encoder);

        assert_eq!(starred.predicted_name, "*STARBUCKS");
        assert_eq!(starred.first_letter, Some('s'));
        assert_eq!(starred.letter_set, plain.letter_set);
        assert_eq!(starred.phonetic_primary, plain.phonetic_primary);
        assert_eq!(crate::cluster::Canonicalizer::votes(&starred, &plain), 3);
    }
}
