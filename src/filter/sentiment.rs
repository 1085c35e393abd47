use std::{fs, path::Path};

use indexmap::IndexMap;
use tracing::info;

use crate::{
    config::SentimentMode,
    error::{ResponderError, Result},
    responder::NO_MATCH,
};

/// Signed sentiment of a text. Only the sign is used for filtering.
pub trait SentimentScorer {
    fn compute_sentiment(&self, text: &str) -> i32;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> i32,
{
    #[inline]
    fn compute_sentiment(&self, text: &str) -> i32 {
        self(text)
    }
}

/// Word list scorer: the sentiment of a text is the sum of the scores of
/// its words. Unknown words score 0.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment {
    scores: IndexMap<String, i32>,
}

impl LexiconSentiment {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        Self {
            scores: entries
                .into_iter()
                .map(|(w, s)| (w.as_ref().to_lowercase(), s))
                .collect(),
        }
    }

    /// Parse `word<whitespace>score` lines; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut scores = IndexMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (word, score) = line
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| ResponderError::Config(format!("lexicon line {}: missing score", number + 1)))?;
            let score: i32 = score.trim().parse().map_err(|e| {
                ResponderError::Config(format!("lexicon line {}: bad score `{score}`: {e}", number + 1))
            })?;
            scores.insert(word.trim().to_lowercase(), score);
        }
        Ok(Self { scores })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ResponderError::resource(path, e))?;
        let lexicon = Self::parse(&text)?;
        info!(path = %path.display(), words = lexicon.len(), "sentiment lexicon loaded");
        Ok(lexicon)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl SentimentScorer for LexiconSentiment {
    fn compute_sentiment(&self, text: &str) -> i32 {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .map(|w| self.scores.get(w.to_lowercase().as_str()).copied().unwrap_or(0))
            .sum()
    }
}

/// Apply the enabled sentiment filters to `candidates`.
///
/// Exclusion drops negative candidates, matching keeps candidates with the
/// query's sign. Exclusion takes precedence: with both enabled, matching
/// is skipped. An empty result becomes the single no-match answer.
pub fn filter_by_sentiment<S>(candidates: Vec<String>, query: &str, mode: SentimentMode, scorer: &S) -> Vec<String>
where
    S: SentimentScorer + ?Sized,
{
    let mut kept = candidates;
    if mode.exclude_negative {
        kept.retain(|c| scorer.compute_sentiment(c) >= 0);
    } else if mode.match_sentiment {
        let query_sentiment = scorer.compute_sentiment(query);
        kept.retain(|c| same_sign(scorer.compute_sentiment(c), query_sentiment));
    }
    if kept.is_empty() {
        return vec![NO_MATCH.to_string()];
    }
    kept
}

/// Same sign, zero counting as its own sign
#[inline]
pub fn same_sign(a: i32, b: i32) -> bool {
    a.signum() == b.signum()
}
