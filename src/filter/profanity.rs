use std::path::Path;

use regex::{Regex, RegexBuilder};
use tracing::info;

use crate::{
    error::{ResponderError, Result},
    utils::resource::read_word_list,
};

/// Replacement for a masked word
pub const CENSOR_MARKER: &str = "<censored>";

/// Masks listed words in candidate responses.
///
/// A word is masked only where it stands alone: the characters around the
/// match (if any) must not be alphanumeric, and a candidate's start and end
/// count as boundaries. Matching ignores case.
#[derive(Debug, Clone, Default)]
pub struct ProfanityFilter {
    words: Vec<String>,
    patterns: Vec<Regex>,
}

impl ProfanityFilter {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        let patterns = words
            .iter()
            .map(|w| {
                RegexBuilder::new(&regex::escape(w))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ResponderError::Config(format!("profanity pattern `{w}`: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { words, patterns })
    }

    /// Load one word per line.
    ///
    /// # Errors
    /// `Resource` when the list cannot be read. There is no fallback list.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let filter = Self::new(read_word_list(path.as_ref())?)?;
        info!(words = filter.words.len(), "profanity list loaded");
        Ok(filter)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Mask every listed word in every candidate.
    /// Candidates are masked one by one, so a candidate holding a line
    /// break stays a single candidate.
    pub fn mask(&self, candidates: &[String]) -> Vec<String> {
        let masked: Vec<String> = candidates.iter().map(|c| self.mask_one(c)).collect();
        debug_assert_eq!(masked.len(), candidates.len());
        masked
    }

    fn mask_one(&self, candidate: &str) -> String {
        self.patterns
            .iter()
            .fold(candidate.to_string(), |text, pattern| mask_whole_words(pattern, &text))
    }
}

fn mask_whole_words(pattern: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let bounded = !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric);
        if bounded {
            out.push_str(&text[last..m.start()]);
            out.push_str(CENSOR_MARKER);
            last = m.end();
        }
    }
    out.push_str(&text[last..]);
    out
}
