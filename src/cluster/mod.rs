//! Top cluster selection over similarity scores.
//!
//! The scores of a ranking are clustered in one dimension; the highest
//! cluster is split further (more clusters) until it is small enough or
//! cannot be split any more.

use linfa::{
    traits::{Fit, Predict},
    DatasetBase,
};
use linfa_clustering::KMeans as LinfaKMeans;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use crate::{
    config::SelectorConfig,
    error::{ResponderError, Result},
    vectorizer::evaluate::scoring::SimilarityRanking,
};

/// Result of one clustering pass.
/// Clusters are ordered ascending by centroid; members keep input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Vec<f32>>,
    /// centroid of each cluster, same order as `clusters`
    pub centroids: Vec<f32>,
}

impl Clustering {
    /// Highest valued cluster
    pub fn top(&self) -> Option<&[f32]> {
        self.clusters.last().map(Vec::as_slice)
    }
}

/// 1-D clustering primitive.
/// Implementations must be deterministic for identical input.
pub trait Clusterer {
    fn cluster(&self, values: &[f32], k: usize) -> Result<Clustering>;
}

/// k-means from `linfa-clustering`, seeded per call
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    pub seed: u64,
    pub max_iterations: u64,
    /// independent initialisations, the lowest inertia wins
    pub n_runs: usize,
}

impl KMeans {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_iterations: 100,
            n_runs: 10,
        }
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, values: &[f32], k: usize) -> Result<Clustering> {
        // k-means++ cannot place more centroids than distinct points
        let k = k.min(distinct_count(values));
        if k == 0 {
            return Ok(Clustering::default());
        }
        let records = Array2::from_shape_vec((values.len(), 1), values.iter().map(|&v| v as f64).collect())
            .map_err(|e| ResponderError::Cluster(e.to_string()))?;
        let dataset = DatasetBase::from(records.clone());
        let model = LinfaKMeans::params_with_rng(k, StdRng::seed_from_u64(self.seed))
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iterations)
            .tolerance(1e-6)
            .fit(&dataset)
            .map_err(|e| ResponderError::Cluster(e.to_string()))?;
        let labels: Array1<usize> = model.predict(&records);

        let centroids = model.centroids();
        let mut groups: Vec<(f64, Vec<f32>)> = (0..centroids.nrows()).map(|c| (centroids[[c, 0]], Vec::new())).collect();
        for (&label, &v) in labels.iter().zip(values) {
            let group = groups
                .get_mut(label)
                .ok_or_else(|| ResponderError::Cluster(format!("label {label} out of range")))?;
            group.1.push(v);
        }
        groups.retain(|(_, members)| !members.is_empty());
        groups.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Clustering {
            centroids: groups.iter().map(|(c, _)| *c as f32).collect(),
            clusters: groups.into_iter().map(|(_, m)| m).collect(),
        })
    }
}

fn distinct_count(values: &[f32]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Lines whose score lands in the top cluster.
///
/// `None` when the ranking is empty or its best score is below
/// `config.min_similarity`. Scores of the top cluster are visited in
/// ascending order, lines ascending within a score.
///
/// # Errors
/// `Cluster` when the clusterer fails.
pub fn select_top_cluster<C>(
    ranking: &SimilarityRanking,
    clusterer: &C,
    config: &SelectorConfig,
) -> Result<Option<Vec<usize>>>
where
    C: Clusterer + ?Sized,
{
    let Some(max) = ranking.max_score() else {
        return Ok(None);
    };
    if max < config.min_similarity {
        debug!(max, "best score below threshold");
        return Ok(None);
    }
    let scores = ranking.scores();
    let distinct = scores.len();
    let mut k = config.initial_clusters.max(1).min(distinct);
    let mut clustering = clusterer.cluster(&scores, k)?;
    while clustering.top().map_or(0, <[f32]>::len) > config.max_top_cluster && k < distinct {
        k += 1;
        clustering = clusterer.cluster(&scores, k)?;
    }
    let Some(top) = clustering.top() else {
        return Ok(None);
    };
    debug!(k, distinct, top = top.len(), "top cluster selected");
    Ok(Some(
        top.iter()
            .flat_map(|&score| ranking.lines(score).iter().copied())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(scores: &[(usize, f32)]) -> SimilarityRanking {
        SimilarityRanking::from_scores(scores.iter().copied())
    }

    #[test]
    fn kmeans_separates_obvious_groups() {
        let values = [0.0, 0.01, 0.02, 0.5, 0.51, 0.95, 0.96];
        let clustering = KMeans::new(7).cluster(&values, 3).unwrap();
        assert!(clustering.clusters.len() <= 3);
        let top = clustering.top().unwrap();
        assert!(top.contains(&0.95) && top.contains(&0.96));
        assert!(!top.contains(&0.0) && !top.contains(&0.02));
    }

    #[test]
    fn kmeans_is_deterministic_for_a_seed() {
        let values: Vec<f32> = (0..40).map(|i| ((i * 37) % 101) as f32 / 100.0).collect();
        let a = KMeans::new(18_021_918).cluster(&values, 4).unwrap();
        let b = KMeans::new(18_021_918).cluster(&values, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn kmeans_clusters_are_ascending_and_cover_input() {
        let values: Vec<f32> = (0..25).map(|i| (i as f32 * 0.73).sin().abs()).collect();
        let clustering = KMeans::new(1).cluster(&values, 5).unwrap();
        let mut seen: Vec<f32> = clustering.clusters.iter().flatten().copied().collect();
        seen.sort_by(f32::total_cmp);
        let mut expected = values.clone();
        expected.sort_by(f32::total_cmp);
        assert_eq!(seen, expected);
        for pair in clustering.centroids.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn k_equal_to_len_gives_singletons() {
        let values = [0.1, 0.4, 0.9];
        let clustering = KMeans::new(3).cluster(&values, 3).unwrap();
        assert_eq!(clustering.clusters, vec![vec![0.1], vec![0.4], vec![0.9]]);
    }

    #[test]
    fn kmeans_handles_empty_input() {
        assert!(KMeans::new(0).cluster(&[], 3).unwrap().top().is_none());
    }

    #[test]
    fn repeated_values_cap_the_cluster_count() {
        let values = [0.5, 0.5, 0.5, 0.9];
        let clustering = KMeans::new(2).cluster(&values, 4).unwrap();
        assert_eq!(clustering.clusters, vec![vec![0.5, 0.5, 0.5], vec![0.9]]);
    }

    #[test]
    fn different_seeds_agree_on_well_separated_groups() {
        let values = [0.05, 0.06, 0.07, 0.6, 0.62, 0.97, 0.98];
        let a = KMeans::new(1).cluster(&values, 3).unwrap();
        let b = KMeans::new(99).cluster(&values, 3).unwrap();
        assert_eq!(a.clusters, b.clusters);
        assert_eq!(a.top(), Some(&[0.97, 0.98][..]));
    }

    #[test]
    fn below_threshold_selects_nothing() {
        let r = ranking(&[(0, 0.05), (1, 0.09)]);
        assert_eq!(select_top_cluster(&r, &KMeans::new(1), &SelectorConfig::default()).unwrap(), None);
        assert_eq!(
            select_top_cluster(&SimilarityRanking::new(), &KMeans::new(1), &SelectorConfig::default()).unwrap(),
            None
        );
    }

    #[test]
    fn top_cluster_expands_to_every_tied_line() {
        let r = ranking(&[(0, 0.0), (1, 0.8), (2, 0.0), (3, 0.8), (4, 0.3)]);
        let lines = select_top_cluster(&r, &KMeans::new(1), &SelectorConfig::default()).unwrap().unwrap();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn refinement_shrinks_a_crowded_top_cluster() {
        // five close high scores, one low outlier
        let r = ranking(&[
            (0, 0.0),
            (1, 0.90),
            (2, 0.91),
            (3, 0.92),
            (4, 0.93),
            (5, 0.99),
        ]);
        let config = SelectorConfig::default();
        let lines = select_top_cluster(&r, &KMeans::new(5), &config).unwrap().unwrap();
        assert!(!lines.is_empty());
        let top_scores: Vec<f32> = lines.iter().map(|&l| r.score_of(l).unwrap()).collect();
        let mut distinct = top_scores.clone();
        distinct.dedup();
        assert!(distinct.len() <= config.max_top_cluster);
        assert!(lines.contains(&5));
    }

    /// Puts every value in one cluster regardless of k
    struct Lump;
    impl Clusterer for Lump {
        fn cluster(&self, values: &[f32], _k: usize) -> Result<Clustering> {
            Ok(Clustering {
                clusters: vec![values.to_vec()],
                centroids: vec![0.0],
            })
        }
    }

    #[test]
    fn refinement_stops_when_k_reaches_distinct_count() {
        let r = ranking(&[(0, 0.2), (1, 0.3), (2, 0.4), (3, 0.5), (4, 0.6)]);
        let lines = select_top_cluster(&r, &Lump, &SelectorConfig::default()).unwrap().unwrap();
        assert_eq!(lines, vec![0, 1, 2, 3, 4]);
    }
}
