//! Mnemonic phrase validation.

use std::fmt;

use crate::config::ConfigError;

/// Word counts accepted for a BIP-39 phrase.
pub const VALID_WORD_COUNTS: [usize; 4] = [12, 15, 18, 24];

/// A seed phrase whose word count has been checked.
///
/// The phrase is kept exactly as supplied. `Debug` and `Display` only show
/// the word count.
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicPhrase {
    phrase: String,
    word_count: usize,
}

impl MnemonicPhrase {
    /// Validate a raw phrase.
    ///
    /// Words are maximal runs of ASCII letters, so separators and stray
    /// punctuation are ignored when counting.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let word_count = Self::count_words(raw);
        if !VALID_WORD_COUNTS.contains(&word_count) {
            return Err(ConfigError::InvalidMnemonicLength {
                actual: word_count,
                allowed: VALID_WORD_COUNTS,
            });
        }

        Ok(Self {
            phrase: raw.to_string(),
            word_count,
        })
    }

    pub fn count_words(raw: &str) -> usize {
        raw.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|word| !word.is_empty())
            .count()
    }

    /// The phrase, verbatim. Only for handing to the deploy tool.
    pub fn expose(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

impl fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicPhrase({self})")
    }
}

impl fmt::Display for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted, {} words>", self.word_count)
    }
}
