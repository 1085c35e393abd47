use num::Float;

pub trait Compare<N>
where
    N: Float,
{
    /// Euclidean norm
    /// ||a|| = sqrt(Σ(a_i^2))
    fn magnitude(vec: impl Iterator<Item = N>) -> N;

    /// a_i / ||a||, 0 when ||a|| is 0
    fn normalize(value: N, magnitude: N) -> N;

    /// One-sided normalized dot product
    /// s(d, q) = Σ_{t in d} (d_t / ||d||) * q̂_t
    ///
    /// `query` returns the already normalized query weight of a term,
    /// `None` (treated as 0) when the query does not contain it.
    fn normalized_dot<'a>(
        doc: impl Iterator<Item = (&'a str, N)>,
        doc_magnitude: N,
        query: impl Fn(&str) -> Option<N>,
    ) -> N;
}

#[derive(Debug)]
pub struct DefaultCompare;

impl<N> Compare<N> for DefaultCompare
where
    N: Float,
{
    #[inline]
    fn magnitude(vec: impl Iterator<Item = N>) -> N {
        vec.fold(N::zero(), |acc, v| acc + v * v).sqrt()
    }

    #[inline]
    fn normalize(value: N, magnitude: N) -> N {
        if magnitude == N::zero() {
            N::zero()
        } else {
            value / magnitude
        }
    }

    #[inline]
    fn normalized_dot<'a>(
        doc: impl Iterator<Item = (&'a str, N)>,
        doc_magnitude: N,
        query: impl Fn(&str) -> Option<N>,
    ) -> N {
        doc.fold(N::zero(), |acc, (term, weight)| {
            let q = query(term).unwrap_or_else(N::zero);
            acc + Self::normalize(weight, doc_magnitude) * q
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn magnitude_is_euclidean() {
        let m: f32 = DefaultCompare::magnitude([3.0f32, 4.0].into_iter());
        assert_eq!(m, 5.0);
        let empty: f64 = DefaultCompare::magnitude(std::iter::empty());
        assert_eq!(empty, 0.0);
    }

    #[test]
    fn normalize_guards_zero_magnitude() {
        assert_eq!(<DefaultCompare as Compare<f32>>::normalize(2.0, 0.0), 0.0);
        assert_eq!(<DefaultCompare as Compare<f32>>::normalize(2.0, 4.0), 0.5);
    }

    #[test]
    fn normalized_dot_ignores_terms_missing_from_query() {
        let query: HashMap<&str, f32> = [("a", 0.6), ("b", 0.8)].into_iter().collect();
        let doc = [("a", 3.0f32), ("c", 4.0)];
        let s: f32 = DefaultCompare::normalized_dot(doc.iter().copied(), 5.0, |t| query.get(t).copied());
        assert!((s - 0.36).abs() < 1e-6);
    }

    #[test]
    fn identical_vectors_score_one() {
        let weights = [("x", 1.0f64), ("y", 2.0), ("z", 2.0)];
        let mag = DefaultCompare::magnitude(weights.iter().map(|(_, w)| *w));
        let normed: HashMap<&str, f64> = weights
            .iter()
            .map(|(t, w)| (*t, DefaultCompare::normalize(*w, mag)))
            .collect();
        let s: f64 = DefaultCompare::normalized_dot(weights.iter().copied(), mag, |t| normed.get(t).copied());
        assert!((s - 1.0).abs() < 1e-12);
    }
}
