//! Clustering of predicted names into general names
//!
//! Every fingerprint is compared against every other one. A pair earns one
//! vote for each signal it shares:
//!
//! - phonetic overlap (the code sets differ by fewer than two codes)
//! - the same first letter
//! - the smaller first-word letter set is contained in the larger one
//!
//! Pairs reaching the vote threshold are derivatives of each other. Each
//! fingerprint's general name is then picked from its derivative list, which
//! always holds the fingerprint's own name as well.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{CompanyFingerprint, GeneralName};

/// General name chosen for one fingerprint, with the names that led to it
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    pub description: String,
    pub derivatives: Vec<String>,
    pub general_name: String,
}

impl From<&ClusterAssignment> for GeneralName {
    fn from(a: &ClusterAssignment) -> Self {
        GeneralName {
            description: a.description.clone(),
            general_name: a.general_name.clone(),
        }
    }
}

/// Pairwise-vote clustering over a fingerprint population
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer {
    vote_threshold: u32,
}

impl Canonicalizer {
    pub fn new(vote_threshold: u32) -> Self {
        Self { vote_threshold }
    }

    /// Number of signals two fingerprints agree on (0 to 3)
    pub fn votes(a: &CompanyFingerprint, b: &CompanyFingerprint) -> u32 {
        let mut votes = 0;

        let codes_a: BTreeSet<Option<&str>> =
            [a.phonetic_primary.as_deref(), a.phonetic_alternate.as_deref()].into();
        let codes_b: BTreeSet<Option<&str>> =
            [b.phonetic_primary.as_deref(), b.phonetic_alternate.as_deref()].into();
        if codes_a.symmetric_difference(&codes_b).count() < 2 {
            votes += 1;
        }

        if a.first_letter == b.first_letter {
            votes += 1;
        }

        let contained = if a.letter_set.len() < b.letter_set.len() {
            a.letter_set.is_subset(&b.letter_set)
        } else {
            b.letter_set.is_subset(&a.letter_set)
        };
        if contained {
            votes += 1;
        }

        votes
    }

    /// Assign a general name to every fingerprint
    ///
    /// The result has one entry per fingerprint, in input order. The same
    /// population always produces the same assignments.
    pub fn canonicalize(&self, population: &[CompanyFingerprint]) -> Vec<ClusterAssignment> {
        let assignments: Vec<ClusterAssignment> = population
            .iter()
            .enumerate()
            .map(|(i, anchor)| {
                let derivatives = self.derivatives(i, population);
                let general_name = general_name(&derivatives);
                debug!(
                    description = %anchor.description,
                    derivatives = derivatives.len(),
                    general_name = %general_name,
                    "Assigned general name"
                );
                ClusterAssignment {
                    description: anchor.description.clone(),
                    derivatives,
                    general_name,
                }
            })
            .collect();

        let clustered = assignments.iter().filter(|a| a.derivatives.len() > 1).count();
        info!(
            fingerprints = population.len(),
            clustered, "Canonicalized company names"
        );
        assignments
    }

    /// Names derived from the anchor, in population order
    ///
    /// A matching fingerprint contributes its description; the anchor
    /// contributes its own predicted name at its own position.
    fn derivatives(&self, anchor: usize, population: &[CompanyFingerprint]) -> Vec<String> {
        let a = &population[anchor];
        population
            .iter()
            .enumerate()
            .filter_map(|(j, b)| {
                if j == anchor {
                    Some(a.predicted_name.to_lowercase())
                } else if Self::votes(a, b) >= self.vote_threshold {
                    Some(b.description.to_lowercase())
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Leading word of the longest derivative, or the sole derivative as is
fn general_name(derivatives: &[String]) -> String {
    match derivatives {
        [] => String::new(),
        [only] => only.clone(),
        _ => {
            let mut longest = &derivatives[0];
            for d in &derivatives[1..] {
                if d.chars().count() > longest.chars().count() {
                    longest = d;
                }
            }
            longest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(
        description: &str,
        name: &str,
        primary: Option<&str>,
        alternate: Option<&str>,
    ) -> CompanyFingerprint {
        let lower = name.to_lowercase();
        CompanyFingerprint {
            description: description.to_string(),
            predicted_name: name.to_string(),
            phonetic_primary: primary.map(String::from),
            phonetic_alternate: alternate.map(String::from),
            first_letter: lower.chars().next(),
            letter_set: lower
                .split_whitespace()
                .next()
                .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect())
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_votes() {
        let a = fp("STARBUCKS 123", "starbucks", Some("STR"), None);
        let b = fp("STARBUCKS COFFEE", "starbucks coffee", Some("STR"), None);
        assert_eq!(Canonicalizer::votes(&a, &b), 3);

        // Different sound and first letter, same letters
        let c = fp("TSARBUCKS", "tsarbucks", Some("TSR"), None);
        assert_eq!(Canonicalizer::votes(&a, &c), 1);
    }

    #[test]
    fn test_phonetic_signal_counts_absent_codes() {
        let a = fp("A", "abc", Some("APK"), Some("APS"));
        let b = fp("B", "abc", Some("APK"), None);
        // {APK, APS} vs {APK, None}: differ by two elements
        assert_eq!(Canonicalizer::votes(&a, &b), 2);

        let c = fp("C", "abc", Some("APK"), Some("APS"));
        assert_eq!(Canonicalizer::votes(&a, &c), 3);
    }

    #[test]
    fn test_letter_set_containment_either_direction() {
        let short = fp("X", "tar", Some("TR"), None);
        let long = fp("Y", "target", Some("TR"), None);
        assert_eq!(Canonicalizer::votes(&short, &long), 3);
        assert_eq!(Canonicalizer::votes(&long, &short), 3);

        let other = fp("Z", "tax", Some("TR"), None);
        assert_eq!(Canonicalizer::votes(&long, &other), 2);
    }

    #[test]
    fn test_mutual_derivatives() {
        let population = vec![
            fp("WALMART 0042", "walmart", Some("ALM"), Some("FLM")),
            fp("WALMART SUPERCENTER", "walmart supercenter", Some("ALM"), Some("FLM")),
            fp("SHELL OIL", "shell", Some("XL"), None),
        ];
        let result = Canonicalizer::default().canonicalize(&population);
        assert_eq!(result.len(), 3);

        assert_eq!(result[0].derivatives, vec!["walmart", "walmart supercenter"]);
        assert_eq!(result[1].derivatives, vec!["walmart 0042", "walmart supercenter"]);
        assert_eq!(result[2].derivatives, vec!["shell"]);

        assert_eq!(result[0].general_name, "walmart");
        assert_eq!(result[1].general_name, "walmart");
        assert_eq!(result[2].general_name, "shell");
    }

    #[test]
    fn test_sole_derivative_used_whole() {
        let population = vec![fp("BLUE BOTTLE", "blue bottle", Some("PLP"), None)];
        let result = Canonicalizer::default().canonicalize(&population);
        assert_eq!(result[0].general_name, "blue bottle");
    }

    #[test]
    fn test_general_name_ties_keep_first() {
        let derivatives = vec!["abc def".to_string(), "xyz uvw".to_string()];
        assert_eq!(general_name(&derivatives), "abc");
    }

    #[test]
    fn test_canonicalize_is_deterministic() {
        let population = vec![
            fp("TARGET T-1234", "target", Some("TRK"), Some("TRJ")),
            fp("TARGET.COM", "target com", Some("TRK"), Some("TRJ")),
        ];
        let canon = Canonicalizer::default();
        let first: Vec<_> = canon
            .canonicalize(&population)
            .iter()
            .map(GeneralName::from)
            .collect();
        let second: Vec<_> = canon
            .canonicalize(&population)
            .iter()
            .map(GeneralName::from)
            .collect();
        assert_eq!(first, second);
    }
}
