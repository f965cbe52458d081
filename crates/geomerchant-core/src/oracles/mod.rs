//! Lookup oracles consulted while tagging tokens
//!
//! - `Dictionary`: is this token a known word?
//! - `PhoneticEncoder`: up to two phonetic codes for a token
//! - `PosTagger`: part-of-speech tag for a single token
//!
//! Oracles never fail: an unknown token is simply "not a word" or
//! "no code".

mod dictionary;
mod phonetic;
mod pos;

pub use dictionary::{Dictionary, WordList};
pub use phonetic::{DoubleMetaphoneEncoder, PhoneticCodes, PhoneticEncoder};
pub use pos::{PosTagger, SuffixTagger};

use crate::config::EngineConfig;
use crate::error::Result;

/// The three oracles bundled for the tagger and fingerprinting
pub struct Oracles {
    pub dictionary: Box<dyn Dictionary>,
    pub phonetic: Box<dyn PhoneticEncoder>,
    pub pos: Box<dyn PosTagger>,
}

impl Oracles {
    /// Build the default oracles from config
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let dictionary = match config.dictionary_path {
            Some(ref path) => WordList::from_path(path)?,
            None => WordList::embedded(),
        };

        Ok(Self {
            dictionary: Box::new(dictionary),
            phonetic: Box::new(DoubleMetaphoneEncoder::new(config.phonetic_code_len)),
            pos: Box::new(SuffixTagger),
        })
    }

    pub fn new(
        dictionary: impl Dictionary + 'static,
        phonetic: impl PhoneticEncoder + 'static,
        pos: impl PosTagger + 'static,
    ) -> Self {
        Self {
            dictionary: Box::new(dictionary),
            phonetic: Box::new(phonetic),
            pos: Box::new(pos),
        }
    }
}
