use indexmap::IndexMap;

use crate::vectorizer::corpus::Corpus;

/// TF-IDF calculation engine.
///
/// `TermStatistics<E>` is generic over the engine so that the weighting
/// scheme can be swapped without touching the bookkeeping.
pub trait TFIDFEngine {
    /// IDF of a term found in `doc_freq` of `doc_num` documents.
    /// `doc_freq` is never 0 for a term present in the table.
    fn idf(doc_num: u64, doc_freq: u64) -> f32;

    /// Weight of a term occurring `count` times in a document
    fn weight(idf: f32, count: u32) -> f32;

    /// IDF for every term of the document frequency table
    fn idf_vec(corpus: &Corpus, doc_num: u64) -> IndexMap<Box<str>, f32> {
        corpus
            .term_counts
            .iter()
            .map(|(term, &doc_freq)| (term.clone(), Self::idf(doc_num, doc_freq)))
            .collect()
    }
}

/// Textbook engine
/// idf = log10(N / df), weight = idf * tf
///
/// Arithmetic is single precision, the ratio is taken before the logarithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f32 {
        let ratio = doc_num as f32 / doc_freq as f32;
        (ratio as f64).log10() as f32
    }

    #[inline]
    fn weight(idf: f32, count: u32) -> f32 {
        idf * count as f32
    }
}
