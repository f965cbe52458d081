//! Phonetic encoding using Double Metaphone

use rphonetic::DoubleMetaphone;

/// Up to two phonetic codes for one token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneticCodes {
    pub primary: Option<String>,
    pub alternate: Option<String>,
}

impl PhoneticCodes {
    /// The code stored in the running phonetic count table
    pub fn counted(&self) -> Option<&str> {
        self.primary.as_deref().or(self.alternate.as_deref())
    }
}

/// Maps a token to one or two phonetic codes
pub trait PhoneticEncoder: Send + Sync {
    fn encode(&self, token: &str) -> PhoneticCodes;
}

/// Double Metaphone with codes cut to a fixed length
pub struct DoubleMetaphoneEncoder {
    encoder: DoubleMetaphone,
    max_len: usize,
}

impl DoubleMetaphoneEncoder {
    pub fn new(max_len: usize) -> Self {
        Self {
            encoder: DoubleMetaphone::default(),
            max_len,
        }
    }
}

impl Default for DoubleMetaphoneEncoder {
    fn default() -> Self {
        Self::new(3)
    }
}

impl PhoneticEncoder for DoubleMetaphoneEncoder {
    fn encode(&self, token: &str) -> PhoneticCodes {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return PhoneticCodes::default();
        }

        let result = self.encoder.double_metaphone(&token);
        let primary: String = result.primary().to_string().chars().take(self.max_len).collect();
        let alternate: String = result
            .alternate()
            .to_string()
            .chars()
            .take(self.max_len)
            .collect();

        let primary = Some(primary).filter(|p| !p.is_empty());
        let alternate = Some(alternate).filter(|a| !a.is_empty() && Some(a) != primary.as_ref());

        PhoneticCodes { primary, alternate }
    }
}
