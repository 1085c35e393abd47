use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ResponderError, Result};

/// Seed used for cluster initialisation unless configured otherwise
pub const DEFAULT_SEED: u64 = 18_021_918;

/// How query time IDF relates to the training corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfPolicy {
    /// The query's terms are counted on top of the corpus document
    /// frequencies for this request only; idf uses N + 1 documents.
    /// Shared tables are left untouched.
    #[default]
    Overlay,
    /// The query is ingested into the shared tables. Document frequency
    /// keeps growing across queries and the IDF table is recomputed over
    /// N + 1 documents on every query.
    Incremental,
    /// IDF stays at its training values. Query terms unknown to the
    /// corpus carry no weight.
    Frozen,
}

/// Sentiment based response filtering.
/// When both modes are enabled only exclusion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentMode {
    /// drop candidates with negative sentiment
    pub exclude_negative: bool,
    /// keep candidates whose sentiment sign equals the query's
    pub match_sentiment: bool,
}

impl SentimentMode {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.exclude_negative || self.match_sentiment
    }
}

/// Top cluster selection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// below this best score there is no answer
    pub min_similarity: f32,
    /// k of the first clustering pass
    pub initial_clusters: usize,
    /// refine while the top cluster holds more scores than this
    pub max_top_cluster: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.1,
            initial_clusters: 3,
            max_top_cluster: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub idf_policy: IdfPolicy,
    pub sentiment: SentimentMode,
    pub selector: SelectorConfig,
    pub seed: u64,
}

impl ResponderConfig {
    /// Read a TOML config. Missing keys keep their defaults.
    ///
    /// # Errors
    /// `Resource` when the file cannot be read, `Config` when it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ResponderError::resource(path, e))?;
        toml::from_str(&content)
            .map_err(|e| ResponderError::Config(format!("failed to parse config file '{}': {e}", path.display())))
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            idf_policy: IdfPolicy::default(),
            sentiment: SentimentMode::default(),
            selector: SelectorConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = ResponderConfig::default();
        assert_eq!(config.idf_policy, IdfPolicy::Overlay);
        assert!(!config.sentiment.is_enabled());
        assert_eq!(config.selector.min_similarity, 0.1);
        assert_eq!(config.selector.initial_clusters, 3);
        assert_eq!(config.selector.max_top_cluster, 3);
        assert_eq!(config.seed, 18_021_918);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ResponderConfig = toml::from_str(
            "idf_policy = \"incremental\"\n[sentiment]\nmatch_sentiment = true\n[selector]\nmax_top_cluster = 5\n",
        )
        .unwrap();
        assert_eq!(config.idf_policy, IdfPolicy::Incremental);
        assert!(config.sentiment.match_sentiment && !config.sentiment.exclude_negative);
        assert_eq!(config.selector.max_top_cluster, 5);
        assert_eq!(config.selector.min_similarity, 0.1);
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn from_file_reports_read_and_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ResponderConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ResponderError::Resource { .. }));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "idf_policy = \"sometimes\"\n").unwrap();
        assert!(matches!(ResponderConfig::from_file(&bad), Err(ResponderError::Config(_))));

        let good = dir.path().join("responder.toml");
        fs::write(&good, "seed = 7\n").unwrap();
        assert_eq!(ResponderConfig::from_file(&good).unwrap().seed, 7);
    }

    #[test]
    fn sentiment_mode_enabled_by_either_flag() {
        let mut mode = SentimentMode::default();
        mode.match_sentiment = true;
        assert!(mode.is_enabled());
    }
}
