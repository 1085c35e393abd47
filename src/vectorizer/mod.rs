pub mod analyzer;
pub mod compute;
pub mod corpus;
pub mod evaluate;
pub mod tfidf;
pub mod token;

use std::{fmt, marker::PhantomData};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    config::IdfPolicy,
    error::{ResponderError, Result},
    vectorizer::{
        analyzer::Analyzer,
        compute::compare::{Compare, DefaultCompare},
        corpus::Corpus,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        token::TokenFrequency,
    },
};

/// Document slot.
/// Corpus lines are `Line(0..N)`, the live query owns the reserved `Query` slot (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocIndex {
    Query,
    Line(usize),
}

impl DocIndex {
    /// Signed index, -1 for the query
    pub fn as_i64(self) -> i64 {
        match self {
            DocIndex::Query => -1,
            DocIndex::Line(i) => i as i64,
        }
    }
}

impl fmt::Display for DocIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// tf-idf weights of one document and their euclidean norm
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedVector {
    pub weights: IndexMap<Box<str>, f32>,
    pub magnitude: f32,
}

impl WeightedVector {
    #[inline]
    pub fn weight(&self, term: &str) -> Option<f32> {
        self.weights.get(term).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(t, &w)| (t.as_ref(), w))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IDFVector {
    /// term -> idf
    pub idf_vec: IndexMap<Box<str>, f32>,
    /// document count the table was computed with
    pub doc_num: u64,
}

/// Term statistics of one session.
///
/// Holds:
/// - per document term frequencies
/// - the corpus wide document frequency table
/// - the IDF table derived from it
/// - per document tf-idf vectors and magnitudes
///
/// Corpus vectors are weighed once at training time (or on an explicit
/// `reweigh_corpus`). Query processing may recompute the IDF table, so
/// corpus vectors can lag behind it; this drift is intentional.
///
/// One query at a time: the query slot is shared state.
#[derive(Debug, Clone)]
pub struct TermStatistics<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    pub analyzer: Analyzer,
    /// document -> term counts
    pub term_freqs: IndexMap<DocIndex, TokenFrequency>,
    /// document frequency, N counts corpus lines only
    pub corpus: Corpus,
    pub idf_cache: IDFVector,
    /// document -> tf-idf vector
    pub weighted: IndexMap<DocIndex, WeightedVector>,
    _marker: PhantomData<E>,
}

impl<E> TermStatistics<E>
where
    E: TFIDFEngine,
{
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            term_freqs: IndexMap::new(),
            corpus: Corpus::new(),
            idf_cache: IDFVector::default(),
            weighted: IndexMap::new(),
            _marker: PhantomData,
        }
    }

    /// Ingest, then compute IDF over the corpus and weigh every line.
    pub fn train<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = self.corpus.get_doc_num() as usize;
        for (offset, line) in lines.into_iter().enumerate() {
            self.ingest(DocIndex::Line(start + offset), line.as_ref());
        }
        self.refresh()
    }

    /// Recompute IDF over the corpus size and reweigh every line
    pub fn refresh(&mut self) -> Result<()> {
        self.recompute_idf(self.doc_num());
        self.reweigh_corpus()
    }

    /// Number of corpus lines ingested, including lines without tokens
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.corpus.get_doc_num()
    }

    /// Tokenize `text` and record its term counts at `doc`.
    ///
    /// Every distinct term bumps its document frequency once. A corpus
    /// line always counts toward N, even without tokens. The query slot is
    /// overwritten and never counts toward N.
    ///
    /// Returns the number of tokens kept.
    pub fn ingest(&mut self, doc: DocIndex, text: &str) -> usize {
        let tokens = self.analyzer.normalize(text);
        let freq: TokenFrequency = tokens.iter().collect();
        let distinct = freq.token_set_ref_str();
        match doc {
            DocIndex::Line(_) => {
                debug_assert!(!self.term_freqs.contains_key(&doc), "line {doc} ingested twice");
                if distinct.is_empty() {
                    self.corpus.add_empty();
                } else {
                    self.corpus.add_set(&distinct);
                }
            }
            DocIndex::Query => self.corpus.add_terms(&distinct),
        }
        if freq.is_empty() {
            self.term_freqs.shift_remove(&doc);
        } else {
            self.term_freqs.insert(doc, freq);
        }
        tokens.len()
    }

    /// idf[t] = log10(total / df[t]) for every known term
    pub fn recompute_idf(&mut self, total_doc_count: u64) {
        self.idf_cache.idf_vec = E::idf_vec(&self.corpus, total_doc_count);
        self.idf_cache.doc_num = total_doc_count;
    }

    /// Weigh one document against the current IDF table.
    ///
    /// # Errors
    /// `MissingTerm` when a term has no IDF entry, which means the
    /// document was weighed before its terms were counted.
    pub fn weigh(&mut self, doc: DocIndex) -> Result<()> {
        let Some(freq) = self.term_freqs.get(&doc) else {
            self.weighted.shift_remove(&doc);
            return Ok(());
        };
        let vector = weigh_strict::<E>(freq, &self.idf_cache)?;
        self.weighted.insert(doc, vector);
        Ok(())
    }

    /// Weigh every corpus line against the current IDF table
    pub fn reweigh_corpus(&mut self) -> Result<()> {
        let idf = &self.idf_cache;
        let vectors = self
            .term_freqs
            .par_iter()
            .filter(|(doc, _)| matches!(doc, DocIndex::Line(_)))
            .map(|(doc, freq)| weigh_strict::<E>(freq, idf).map(|v| (*doc, v)))
            .collect::<Result<Vec<_>>>()?;
        for (doc, vector) in vectors {
            self.weighted.insert(doc, vector);
        }
        debug!(
            documents = self.doc_num(),
            vocabulary = self.corpus.vocab_size(),
            "corpus weighed"
        );
        Ok(())
    }

    /// Query time sequence.
    ///
    /// Fills the query slot for `text` under `policy`. Corpus vectors are
    /// never touched here.
    pub fn prepare_query(&mut self, text: &str, policy: IdfPolicy) -> Result<()> {
        self.term_freqs.shift_remove(&DocIndex::Query);
        self.weighted.shift_remove(&DocIndex::Query);
        let total = self.doc_num() + 1;
        match policy {
            IdfPolicy::Incremental => {
                self.ingest(DocIndex::Query, text);
                self.recompute_idf(total);
                self.weigh(DocIndex::Query)?;
            }
            IdfPolicy::Overlay => {
                let freq: TokenFrequency = self.analyzer.normalize(text).iter().collect();
                if freq.is_empty() {
                    return Ok(());
                }
                // the query itself contains each of its terms once
                let corpus = &self.corpus;
                let vector = weigh_with::<E>(&freq, |term| {
                    Some(E::idf(total, corpus.get_term_count(term) + 1))
                });
                self.term_freqs.insert(DocIndex::Query, freq);
                self.weighted.insert(DocIndex::Query, vector);
            }
            IdfPolicy::Frozen => {
                let freq: TokenFrequency = self.analyzer.normalize(text).iter().collect();
                if freq.is_empty() {
                    return Ok(());
                }
                let idf = &self.idf_cache;
                let vector = weigh_with::<E>(&freq, |term| idf.idf_vec.get(term).copied());
                self.term_freqs.insert(DocIndex::Query, freq);
                self.weighted.insert(DocIndex::Query, vector);
            }
        }
        Ok(())
    }

    pub fn query_vector(&self) -> Option<&WeightedVector> {
        self.weighted.get(&DocIndex::Query)
    }

    /// Weighted vectors of corpus lines, in ingestion order
    pub fn corpus_vectors(&self) -> impl Iterator<Item = (usize, &WeightedVector)> {
        self.weighted.iter().filter_map(|(doc, v)| match doc {
            DocIndex::Line(i) => Some((*i, v)),
            DocIndex::Query => None,
        })
    }

    #[inline]
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf_cache.idf_vec.get(term).copied()
    }
}

/// Weigh with an IDF lookup, terms without IDF are omitted
fn weigh_with<E: TFIDFEngine>(
    freq: &TokenFrequency,
    idf: impl Fn(&str) -> Option<f32>,
) -> WeightedVector {
    let weights: IndexMap<Box<str>, f32> = freq
        .iter()
        .filter_map(|(term, count)| idf(term).map(|i| (term.into(), E::weight(i, count))))
        .collect();
    let magnitude = DefaultCompare::magnitude(weights.values().copied());
    WeightedVector { weights, magnitude }
}

fn weigh_strict<E: TFIDFEngine>(freq: &TokenFrequency, idf: &IDFVector) -> Result<WeightedVector> {
    if let Some(term) = freq.iter().map(|(t, _)| t).find(|t| !idf.idf_vec.contains_key(*t)) {
        return Err(ResponderError::MissingTerm {
            term: term.to_string(),
        });
    }
    Ok(weigh_with::<E>(freq, |term| idf.idf_vec.get(term).copied()))
}
