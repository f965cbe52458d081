//! Word feature tagging
//!
//! Each token of a description is tagged with the features that suggest it
//! belongs to a merchant name rather than to the noise around it (store
//! numbers, city names, processor prefixes):
//!
//! | Feature          | Kind    | Value                                             |
//! |------------------|---------|---------------------------------------------------|
//! | dictionary hit   | numeric | 2 if the whole token is a known word, else 0      |
//! | embedded word    | flag    | token, or a prefix of it, is a known word         |
//! | vowel/consonant  | flag    | more than one vowel, consonants ≥ vowels          |
//! | frequency rarity | numeric | word-count z-score, floored at 0                  |
//! | part of speech   | tag     | oracle tag, not weighted                          |
//! | phonetic rarity  | numeric | max z-score of the token's two phonetic codes     |
//! | length bonus     | numeric | 1 if the token is long, else 0                    |

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::error::{Error, Result};
use crate::oracles::Oracles;
use crate::stats::StatisticsSnapshot;

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

/// Which feature a value describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    DictionaryHit,
    EmbeddedWord,
    VowelConsonantShape,
    FrequencyRarity,
    PartOfSpeech,
    PhoneticRarity,
    LengthBonus,
}

/// A feature value, scored by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Contributes 1 when true, else 0
    Flag(bool),
    /// Contributes its raw value (which may be negative)
    Numeric(f64),
    /// Contributes nothing
    Tag(String),
}

impl FeatureValue {
    pub fn contribution(&self) -> f64 {
        match self {
            Self::Flag(true) => 1.0,
            Self::Flag(false) => 0.0,
            Self::Numeric(v) => *v,
            Self::Tag(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub value: FeatureValue,
}

/// All features of one token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub token: String,
    pub features: Vec<Feature>,
}

impl FeatureVector {
    fn get(&self, kind: FeatureKind) -> Option<&FeatureValue> {
        self.features.iter().find(|f| f.kind == kind).map(|f| &f.value)
    }

    fn numeric(&self, kind: FeatureKind) -> f64 {
        match self.get(kind) {
            Some(FeatureValue::Numeric(v)) => *v,
            _ => 0.0,
        }
    }

    fn flag(&self, kind: FeatureKind) -> bool {
        matches!(self.get(kind), Some(FeatureValue::Flag(true)))
    }

    /// 2 for a whole-word dictionary hit, else 0
    pub fn dictionary_hit(&self) -> u8 {
        self.numeric(FeatureKind::DictionaryHit) as u8
    }

    pub fn embedded_word(&self) -> bool {
        self.flag(FeatureKind::EmbeddedWord)
    }

    pub fn vowel_consonant_ok(&self) -> bool {
        self.flag(FeatureKind::VowelConsonantShape)
    }

    pub fn frequency_z(&self) -> f64 {
        self.numeric(FeatureKind::FrequencyRarity)
    }

    pub fn phonetic_z(&self) -> f64 {
        self.numeric(FeatureKind::PhoneticRarity)
    }

    pub fn length_bonus(&self) -> u8 {
        self.numeric(FeatureKind::LengthBonus) as u8
    }

    pub fn part_of_speech(&self) -> Option<&str> {
        match self.get(FeatureKind::PartOfSpeech) {
            Some(FeatureValue::Tag(t)) => Some(t),
            _ => None,
        }
    }
}

/// Produces feature vectors from tokens
pub struct WordTagger<'a> {
    oracles: &'a Oracles,
    config: &'a ScoringConfig,
}

impl<'a> WordTagger<'a> {
    pub fn new(oracles: &'a Oracles, config: &'a ScoringConfig) -> Self {
        Self { oracles, config }
    }

    /// Tag one lowercase token against a frozen snapshot
    ///
    /// Fails with `Error::UnknownToken` if the token was never counted.
    pub fn tag(&self, token: &str, stats: &StatisticsSnapshot) -> Result<FeatureVector> {
        let word_count = stats
            .word_count(token)
            .ok_or_else(|| Error::UnknownToken(token.to_string()))?;

        let is_word = self.oracles.dictionary.contains(token);
        let dictionary_hit = if is_word { 2.0 } else { 0.0 };
        let embedded = is_word || self.has_embedded_word(token);

        let codes = self.oracles.phonetic.encode(token);
        let phonetic_z = [&codes.primary, &codes.alternate]
            .iter()
            .map(|code| {
                let count = code.as_deref().map_or(0, |c| stats.phonetic_count(c));
                stats.phonetic_z(count)
            })
            .fold(f64::NEG_INFINITY, f64::max);

        let frequency_z = stats.word_z(word_count).max(0.0);

        let length = token.chars().count();
        let length_bonus = if length >= self.config.length_bonus_min_len {
            1.0
        } else {
            0.0
        };

        let pos = self.oracles.pos.tag(token);

        let features = vec![
            Feature {
                kind: FeatureKind::DictionaryHit,
                value: FeatureValue::Numeric(dictionary_hit),
            },
            Feature {
                kind: FeatureKind::EmbeddedWord,
                value: FeatureValue::Flag(embedded),
            },
            Feature {
                kind: FeatureKind::VowelConsonantShape,
                value: FeatureValue::Flag(vowel_consonant_ok(token)),
            },
            Feature {
                kind: FeatureKind::FrequencyRarity,
                value: FeatureValue::Numeric(frequency_z),
            },
            Feature {
                kind: FeatureKind::PartOfSpeech,
                value: FeatureValue::Tag(pos),
            },
            Feature {
                kind: FeatureKind::PhoneticRarity,
                value: FeatureValue::Numeric(phonetic_z),
            },
            Feature {
                kind: FeatureKind::LengthBonus,
                value: FeatureValue::Numeric(length_bonus),
            },
        ];

        Ok(FeatureVector {
            token: token.to_string(),
            features,
        })
    }

    /// Any prefix from the minimum length up to (not including) the full
    /// token is a known word. Only tried for tokens longer than the minimum.
    fn has_embedded_word(&self, token: &str) -> bool {
        let min = self.config.embedded_prefix_min_len;
        let chars: Vec<char> = token.chars().collect();
        if chars.len() <= min {
            return false;
        }

        (min..chars.len()).any(|i| {
            let prefix: String = chars[..i].iter().collect();
            self.oracles.dictionary.contains(&prefix)
        })
    }
}

/// More than one vowel, and at least as many consonants as vowels.
/// Anything that is not a vowel (digits and `&` included) is a consonant.
fn vowel_consonant_ok(token: &str) -> bool {
    let vowels = token.chars().filter(|c| VOWELS.contains(c)).count();
    let consonants = token.chars().count() - vowels;
    vowels > 1 && consonants >= vowels
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::oracles::{PhoneticCodes, PhoneticEncoder, SuffixTagger, WordList};

    /// Encoder with fixed codes per token
    struct FixedEncoder(HashMap<&'static str, (Option<&'static str>, Option<&'static str>)>);

    impl PhoneticEncoder for FixedEncoder {
        fn encode(&self, token: &str) -> PhoneticCodes {
            let (p, a) = self.0.get(token).copied().unwrap_or((None, None));
            PhoneticCodes {
                primary: p.map(String::from),
                alternate: a.map(String::from),
            }
        }
    }

    fn oracles() -> Oracles {
        let mut codes = HashMap::new();
        codes.insert("coffee", (Some("KF"), None));
        codes.insert("coffeeshop", (Some("KFX"), Some("KFS")));
        codes.insert("xyz123", (Some("SS"), None));
        Oracles::new(
            WordList::from_words(["coffee", "shop", "the", "cof"]),
            FixedEncoder(codes),
            SuffixTagger,
        )
    }

    fn snapshot() -> StatisticsSnapshot {
        let words = [
            ("coffee", 5),
            ("coffeeshop", 1),
            ("xyz123", 1),
            ("the", 1),
            ("cof", 1),
            ("mart", 1),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
        let phon = [("KF", 4), ("KFX", 1), ("SS", 1)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        StatisticsSnapshot::from_counts(words, phon)
    }

    #[test]
    fn test_dictionary_hit_implies_embedded() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        for token in ["coffee", "the", "cof"] {
            let fv = tagger.tag(token, &stats).unwrap();
            assert_eq!(fv.dictionary_hit(), 2, "{token}");
            assert!(fv.embedded_word(), "{token}");
        }
    }

    #[test]
    fn test_embedded_prefix() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        let fv = tagger.tag("coffeeshop", &stats).unwrap();
        assert_eq!(fv.dictionary_hit(), 0);
        assert!(fv.embedded_word());

        let fv = tagger.tag("mart", &stats).unwrap();
        assert!(!fv.embedded_word());
    }

    #[test]
    fn test_embedded_prefix_excludes_full_length() {
        // "cof" is a word, but a 3-letter non-word token is never scanned
        let oracles = Oracles::new(
            WordList::from_words(["abc"]),
            FixedEncoder(HashMap::new()),
            SuffixTagger,
        );
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        assert!(tagger.has_embedded_word("abcd"));
        assert!(!tagger.has_embedded_word("abc"));
        assert!(!tagger.has_embedded_word("xabc"));
    }

    #[test]
    fn test_length_bonus() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        assert_eq!(tagger.tag("coffee", &stats).unwrap().length_bonus(), 1);
        assert_eq!(tagger.tag("coffeeshop", &stats).unwrap().length_bonus(), 1);
        assert_eq!(tagger.tag("mart", &stats).unwrap().length_bonus(), 0);
        assert_eq!(tagger.tag("xyz123", &stats).unwrap().length_bonus(), 1);
    }

    #[test]
    fn test_frequency_z_is_floored() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        // "mart" occurs once, below the mean: raw z is negative
        assert!(stats.word_z(1) < 0.0);
        assert_eq!(tagger.tag("mart", &stats).unwrap().frequency_z(), 0.0);
        assert!(tagger.tag("coffee", &stats).unwrap().frequency_z() > 0.0);
    }

    #[test]
    fn test_phonetic_z_takes_max_and_may_be_negative() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        // Missing alternate counts as 0 occurrences before normalizing
        let fv = tagger.tag("coffee", &stats).unwrap();
        assert!((fv.phonetic_z() - stats.phonetic_z(4)).abs() < 1e-9);

        // Unseen alternate "KFS" also normalizes from 0
        let fv = tagger.tag("coffeeshop", &stats).unwrap();
        let expected = stats.phonetic_z(1).max(stats.phonetic_z(0));
        assert!((fv.phonetic_z() - expected).abs() < 1e-9);

        // No codes at all: both sides normalize from 0, below the mean
        let fv = tagger.tag("mart", &stats).unwrap();
        assert!(fv.phonetic_z() < 0.0);
    }

    #[test]
    fn test_vowel_consonant_shape() {
        assert!(vowel_consonant_ok("coffee"));
        assert!(vowel_consonant_ok("target"));
        assert!(!vowel_consonant_ok("mart"));
        assert!(!vowel_consonant_ok("xyz123")); // "y" is the only vowel
        assert!(!vowel_consonant_ok("aeiou"));
        assert!(vowel_consonant_ok("market"));
        assert!(!vowel_consonant_ok("yoga")); // y, o, a outnumber g
    }

    #[test]
    fn test_unknown_token_is_error() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let stats = snapshot();

        let result = tagger.tag("neverseen", &stats);
        assert!(matches!(result, Err(Error::UnknownToken(t)) if t == "neverseen"));
    }

    #[test]
    fn test_part_of_speech_recorded() {
        let oracles = oracles();
        let config = ScoringConfig::default();
        let tagger = WordTagger::new(&oracles, &config);
        let fv = tagger.tag("the", &snapshot()).unwrap();
        assert_eq!(fv.part_of_speech(), Some("DT"));
    }
}
