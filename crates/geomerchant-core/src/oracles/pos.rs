//! Part-of-speech tagging for single tokens
//!
//! Tags follow the Penn Treebank names. The scorer does not weight them yet.

/// Tags a single token in isolation
pub trait PosTagger: Send + Sync {
    fn tag(&self, token: &str) -> String;
}

/// Closed-class lexicon plus suffix rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixTagger;

impl PosTagger for SuffixTagger {
    fn tag(&self, token: &str) -> String {
        let token = token.to_lowercase();

        let tag = match token.as_str() {
            "" => "SYM",
            "the" | "a" | "an" => "DT",
            "and" | "or" | "&" => "CC",
            "of" | "in" | "at" | "on" | "for" | "by" | "to" => "IN",
            t if t.chars().all(|c| c.is_ascii_digit()) => "CD",
            t if !t.chars().any(char::is_alphabetic) => "SYM",
            t if t.len() > 4 && t.ends_with("ing") => "VBG",
            t if t.len() > 3 && t.ends_with("ed") => "VBD",
            t if t.len() > 3 && t.ends_with("ly") => "RB",
            t if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") => "NNS",
            _ => "NN",
        };

        tag.to_string()
    }
}
