//! Name likelihood scoring

use crate::tagger::FeatureVector;

/// Reduces a feature vector to a score and applies the inclusion threshold
#[derive(Debug, Clone, Copy)]
pub struct NameScorer {
    threshold: f64,
}

impl NameScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Sum of every feature's contribution
    ///
    /// Flags add 1 when set, numerics add their raw value (a negative
    /// phonetic rarity lowers the total), tags add nothing.
    pub fn score(&self, features: &FeatureVector) -> f64 {
        features
            .features
            .iter()
            .map(|f| f.value.contribution())
            .sum()
    }

    /// Whether a score is high enough to join the predicted name
    pub fn includes(&self, score: f64) -> bool {
        score >= self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for NameScorer {
    fn default() -> Self {
        Self::new(3.0)
    }
}
