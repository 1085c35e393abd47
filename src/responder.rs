//! Query orchestration: rank, select, filter, choose.

use std::fmt;

use tracing::{debug, info};

use crate::{
    cluster::{select_top_cluster, Clusterer, KMeans},
    config::ResponderConfig,
    error::{ResponderError, Result},
    filter::{filter_by_sentiment, ProfanityFilter, SentimentScorer},
    vectorizer::{analyzer::Analyzer, evaluate::scoring::SimilarityRanking, DocIndex, TermStatistics},
};

/// Answer given whenever no corpus line qualifies
pub const NO_MATCH: &str = "I don't know";

/// Retrieval based responder over one in-memory corpus.
///
/// Serves one query at a time: `match_best_input` takes `&mut self`
/// because the query occupies a shared slot of the term statistics.
///
/// The default `IdfPolicy::Overlay` keeps queries independent of each
/// other. Callers that need answers identical to the legacy engine across
/// a whole session should configure `IdfPolicy::Incremental`.
pub struct Responder<C = KMeans>
where
    C: Clusterer,
{
    stats: TermStatistics,
    lines: Vec<String>,
    profanity: ProfanityFilter,
    sentiment: Option<Box<dyn SentimentScorer + Send + Sync>>,
    config: ResponderConfig,
    clusterer: C,
}

impl Responder<KMeans> {
    pub fn new(config: ResponderConfig, analyzer: Analyzer, profanity: ProfanityFilter) -> Self {
        let clusterer = KMeans::new(config.seed);
        Self::with_clusterer(config, analyzer, profanity, clusterer)
    }
}

impl<C> Responder<C>
where
    C: Clusterer,
{
    pub fn with_clusterer(config: ResponderConfig, analyzer: Analyzer, profanity: ProfanityFilter, clusterer: C) -> Self {
        Self {
            stats: TermStatistics::new(analyzer),
            lines: Vec::new(),
            profanity,
            sentiment: None,
            config,
            clusterer,
        }
    }

    /// Attach the scorer used by the sentiment filters.
    pub fn with_sentiment<S>(mut self, scorer: S) -> Self
    where
        S: SentimentScorer + Send + Sync + 'static,
    {
        self.sentiment = Some(Box::new(scorer));
        self
    }

    /// Ingest every line and weigh the corpus.
    /// Line `i` of the input answers as document `i` (after any earlier lines).
    pub fn train<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            let line = line.into();
            self.stats.ingest(DocIndex::Line(self.lines.len()), &line);
            self.lines.push(line);
        }
        self.stats.refresh()?;
        info!(
            documents = self.stats.doc_num(),
            vocabulary = self.stats.corpus.vocab_size(),
            "corpus trained"
        );
        Ok(())
    }

    /// Append one line after training.
    /// Blank lines are skipped. The line gets a vector on the next `refresh`.
    ///
    /// Returns the line's index, or `None` when it was skipped.
    pub fn add_line(&mut self, line: impl Into<String>) -> Option<usize> {
        let line = line.into();
        if line.trim().is_empty() {
            return None;
        }
        let index = self.lines.len();
        self.stats.ingest(DocIndex::Line(index), &line);
        self.lines.push(line);
        Some(index)
    }

    /// Recompute IDF over the current corpus and reweigh every line
    pub fn refresh(&mut self) -> Result<()> {
        self.stats.refresh()
    }

    /// Full ranking of the corpus against `query`.
    ///
    /// `None` when no corpus line has a vector.
    ///
    /// # Errors
    /// `EmptyQuery` on an empty query.
    pub fn rank_query(&mut self, query: &str) -> Result<Option<SimilarityRanking>> {
        if query.is_empty() {
            return Err(ResponderError::EmptyQuery);
        }
        self.stats.prepare_query(query, self.config.idf_policy)?;
        Ok(self.stats.similarity())
    }

    /// Best corpus line for `query`, or [`NO_MATCH`].
    ///
    /// # Errors
    /// - `EmptyQuery` on an empty query; callers end the session on it.
    /// - `Config` when sentiment filtering is enabled without a scorer.
    /// - `Cluster` when the clusterer fails.
    pub fn match_best_input(&mut self, query: &str) -> Result<String> {
        let Some(ranking) = self.rank_query(query)? else {
            debug!("no ranked lines");
            return Ok(NO_MATCH.to_string());
        };
        let Some(top) = select_top_cluster(&ranking, &self.clusterer, &self.config.selector)? else {
            return Ok(NO_MATCH.to_string());
        };
        let candidates: Vec<String> = top.iter().filter_map(|&i| self.lines.get(i).cloned()).collect();
        debug!(candidates = candidates.len(), "top cluster lines");

        let mut responses = self.profanity.mask(&candidates);
        let mode = self.config.sentiment;
        if mode.is_enabled() {
            let scorer = self.sentiment.as_deref().ok_or_else(|| {
                ResponderError::Config("sentiment filtering enabled without a sentiment scorer".to_string())
            })?;
            responses = filter_by_sentiment(responses, query, mode, scorer);
            debug!(remaining = responses.len(), "sentiment filtered");
        }
        Ok(choose(&responses))
    }

    /// Corpus line `index`
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn stats(&self) -> &TermStatistics {
        &self.stats
    }
}

impl<C> fmt::Debug for Responder<C>
where
    C: Clusterer + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("lines", &self.lines.len())
            .field("config", &self.config)
            .field("sentiment", &self.sentiment.is_some())
            .field("clusterer", &self.clusterer)
            .finish()
    }
}

/// Pick the answer among filtered candidates.
///
/// Placeholder policy: the first candidate wins, no secondary ranking.
/// Answers are reproducible only as long as this stays the first
/// candidate. An empty list yields [`NO_MATCH`].
pub fn choose(candidates: &[String]) -> String {
    candidates.first().cloned().unwrap_or_else(|| NO_MATCH.to_string())
}
