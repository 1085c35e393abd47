use std::{cmp::Ordering, collections::BTreeMap, fmt::Debug};

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::vectorizer::{
    compute::compare::{Compare, DefaultCompare},
    tfidf::TFIDFEngine,
    DocIndex, TermStatistics,
};

/// Similarity score usable as an ordered map key.
/// Equality is bitwise (after folding -0.0 into 0.0), ordering is `total_cmp`.
#[derive(Clone, Copy)]
pub struct Score(f32);

impl Score {
    #[inline]
    pub fn new(value: f32) -> Self {
        if value == 0.0 {
            Score(0.0)
        } else {
            Score(value)
        }
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Debug for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Ranking of corpus lines against the query.
/// score -> lines achieving exactly that score, ascending by score,
/// lines ascending inside a bucket.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SimilarityRanking {
    pub buckets: BTreeMap<Score, Vec<usize>>,
}

impl SimilarityRanking {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    /// Build from (line, score) pairs
    pub fn from_scores(scores: impl IntoIterator<Item = (usize, f32)>) -> Self {
        let mut ranking = Self::new();
        for (line, score) in scores {
            ranking.buckets.entry(Score::new(score)).or_default().push(line);
        }
        for lines in ranking.buckets.values_mut() {
            lines.sort_unstable();
        }
        ranking
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct scores
    #[inline]
    pub fn distinct_len(&self) -> usize {
        self.buckets.len()
    }

    pub fn max_score(&self) -> Option<f32> {
        self.buckets.keys().next_back().map(|s| s.value())
    }

    /// Distinct scores, ascending
    pub fn scores(&self) -> Vec<f32> {
        self.buckets.keys().map(|s| s.value()).collect()
    }

    /// Lines scoring exactly `score`
    pub fn lines(&self, score: f32) -> &[usize] {
        self.buckets
            .get(&Score::new(score))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Score of a line, if it was ranked
    pub fn score_of(&self, line: usize) -> Option<f32> {
        self.buckets
            .iter()
            .find(|(_, lines)| lines.binary_search(&line).is_ok())
            .map(|(s, _)| s.value())
    }
}

impl Debug for SimilarityRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            // one bucket per line
            writeln!(f, "SimilarityRanking [")?;
            for (score, lines) in &self.buckets {
                writeln!(f, "    {:?}: {:?}", score, lines)?;
            }
            write!(f, "]")
        } else {
            f.debug_map().entries(self.buckets.iter()).finish()
        }
    }
}

impl<E> TermStatistics<E>
where
    E: TFIDFEngine,
{
    /// Similarity of every weighed corpus line to the query slot.
    ///
    /// Each side is normalized by its own magnitude (0 when the magnitude
    /// is 0); the score is the sum over the line's terms of the product of
    /// normalized weights. Query terms absent from the line add nothing.
    /// Without a query vector every line scores 0.
    ///
    /// Returns `None` when no corpus line has a vector.
    pub fn similarity(&self) -> Option<SimilarityRanking> {
        let query: IndexMap<&str, f32> = self
            .query_vector()
            .map(|q| {
                q.iter()
                    .map(|(term, w)| (term, DefaultCompare::normalize(w, q.magnitude)))
                    .collect()
            })
            .unwrap_or_default();

        let scores: Vec<(usize, f32)> = self
            .weighted
            .par_iter()
            .filter_map(|(doc, vector)| match doc {
                DocIndex::Line(line) => Some((*line, vector)),
                DocIndex::Query => None,
            })
            .map(|(line, vector)| {
                let score = DefaultCompare::normalized_dot(vector.iter(), vector.magnitude, |term| {
                    query.get(term).copied()
                });
                (line, score)
            })
            .collect();

        if scores.is_empty() {
            return None;
        }
        Some(SimilarityRanking::from_scores(scores))
    }
}
