/// This crate is a retrieval based response engine built on TF-IDF term statistics.
pub mod cluster;
pub mod config;
pub mod error;
pub mod filter;
pub mod responder;
pub mod store;
pub mod utils;
pub mod vectorizer;

/// Responder
/// The top-level struct of this crate. It is trained on a corpus of short
/// text lines and answers a query with the corpus line most similar to it.
///
/// A query goes through:
/// - TF-IDF weighing of the query under the configured `IdfPolicy`
/// - cosine similarity ranking of every corpus line
/// - top cluster selection with 1-D k-means over the distinct scores
/// - profanity masking and optional sentiment filtering
/// - the first-candidate selector
///
/// Whenever nothing qualifies the answer is `NO_MATCH` ("I don't know").
///
/// `Responder<C>` is generic over the clustering primitive `C`
/// (default `KMeans`).
///
/// # Thread Safety
/// One query at a time. The query occupies a shared slot of the term
/// statistics, so `match_best_input` takes `&mut self`.
pub use responder::{choose, Responder, NO_MATCH};

/// Responder configuration
/// IDF policy, sentiment filter modes, top cluster thresholds and the
/// k-means seed. Serializable; every field has a default.
pub use config::{IdfPolicy, ResponderConfig, SelectorConfig, SentimentMode};

/// Error type of this crate
pub use error::{ResponderError, Result};

/// Term Statistics
/// Term frequencies, document frequencies, IDF and weighted vectors of one
/// session. The live query owns the reserved `DocIndex::Query` slot.
pub use vectorizer::{DocIndex, TermStatistics, WeightedVector};

/// Analyzer
/// Tokenizer and normalizer: contraction and punctuation stripping,
/// lowercasing and stopword removal.
pub use vectorizer::analyzer::Analyzer;

/// Corpus
/// Document frequency table: for every term, the number of documents
/// containing it, plus the number of documents counted.
pub use vectorizer::corpus::Corpus;

/// Token Frequency structure
/// Occurrence counts of each token within one document.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// Plug a different IDF or weighting formula into `TermStatistics<E>`.
/// `DefaultTFIDFEngine` computes `log10(N / df)` and `idf * count`.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Similarity ranking
/// Ascending score -> corpus lines map produced for a query.
pub use vectorizer::evaluate::scoring::{Score, SimilarityRanking};

/// Clustering
pub use cluster::{select_top_cluster, Clusterer, Clustering, KMeans};

/// Response filters
pub use filter::{filter_by_sentiment, LexiconSentiment, ProfanityFilter, SentimentScorer, CENSOR_MARKER};

/// Document store collaborators
/// Publish corpus files line by line under `{corpus}_{file}_{line}` ids.
pub use store::{CorporaIndexer, CorpusSource, DirectorySource, DocumentStore, IndexedLine, MemoryStore};
