use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

/// Contraction suffixes, applied in this order.
/// A word character directly before the suffix is kept, the suffix is dropped
/// (`they're` -> `they`, `don't` -> `do`). The suffix is not expanded.
static CONTRACTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["'re", "'m", "n't", "'ll", "'s", "'d", "'ve"]
        .iter()
        .map(|suffix| {
            Regex::new(&format!("([A-Za-z0-9_]){}", regex::escape(suffix)))
                .expect("contraction pattern is valid")
        })
        .collect()
});

/// Characters deleted outright after contraction stripping.
const STRIPPED: &[char] = &['\'', '"', '.', ';', ':', '?', '!'];

/// Tokenizer / normalizer for corpus lines and queries.
///
/// Owns the stopword set; the rest of the pipeline is a pure function of the text.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    stopwords: IndexSet<String>,
}

impl Analyzer {
    /// Create an analyzer with the given stopwords.
    /// Stopwords are compared against lowercase tokens.
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    #[inline]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// text -> tokens
    ///
    /// Strips contractions and punctuation, splits on spaces, lowercases,
    /// and drops stopwords. Empty input yields no tokens.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let cleaned = remove_punctuation(text);
        cleaned
            .split(' ')
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase)
            .filter(|token| !self.is_stopword(token))
            .collect()
    }
}

/// Remove contractions and punctuation from a sentence.
pub fn remove_punctuation(sentence: &str) -> String {
    let mut sentence = sentence.to_string();
    for pattern in CONTRACTIONS.iter() {
        // replace_all is non-overlapping, so loop until a fixed point
        while pattern.is_match(&sentence) {
            sentence = pattern.replace_all(&sentence, "$1").into_owned();
        }
    }
    sentence.retain(|c| !STRIPPED.contains(&c));
    // commas separate words
    let sentence = sentence.replace(',', " ");
    let mut out = String::with_capacity(sentence.len());
    let mut prev_space = false;
    for c in sentence.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out
}
