//! Dictionary membership

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Embedded English word list (one lowercase word per line)
const EMBEDDED_WORDS: &str = include_str!("../../data/words.txt");

/// Answers whether a token is a known word
pub trait Dictionary: Send + Sync {
    fn contains(&self, word: &str) -> bool;
}

/// In-memory word set
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// The word list compiled into the binary
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_WORDS)
    }

    /// Load a word list file, one word per line
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read dictionary {}: {}",
                path.display(),
                e
            ))
        })?;
        let list = Self::parse(&content);
        debug!(path = %path.display(), words = list.len(), "Loaded dictionary");
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    fn parse(content: &str) -> Self {
        Self::from_words(content.lines().filter(|l| !l.starts_with('#')))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_list_has_common_words() {
        let list = WordList::embedded();
        assert!(!list.is_empty());
        assert!(list.contains("coffee"));
        assert!(list.contains("market"));
        assert!(!list.contains("xyz123"));
    }

    #[test]
    fn test_from_words_lowercases() {
        let list = WordList::from_words(["Coffee", " Shop ", ""]);
        assert_eq!(list.len(), 2);
        assert!(list.contains("coffee"));
        assert!(list.contains("shop"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# comment\nalpha\nbeta\n").unwrap();

        let list = WordList::from_path(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("alpha"));
        assert!(!list.contains("# comment"));
    }
}
