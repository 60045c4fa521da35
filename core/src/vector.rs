use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse TF-IDF vector keyed by term id. Never holds a zero weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    weights: BTreeMap<TermId, f64>,
    norm: f64,
}

impl SparseVector {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn get(&self, term: TermId) -> Option<f64> { self.weights.get(&term).copied() }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (*t, *w))
    }

    /// L2 norm, cached at construction.
    pub fn norm(&self) -> f64 { self.norm }

    /// Dot product over shared terms, summed in ascending term order.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small
            .weights
            .iter()
            .filter_map(|(t, w)| large.weights.get(t).map(|v| w * v))
            .sum()
    }

    /// Cosine similarity; 0 when either vector has zero norm.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        self.dot(other) / (self.norm * other.norm)
    }
}

impl FromIterator<(TermId, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (TermId, f64)>>(iter: I) -> Self {
        let weights: BTreeMap<TermId, f64> = iter.into_iter().filter(|(_, w)| *w != 0.0).collect();
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_are_dropped() {
        let v: SparseVector = vec![(0, 0.0), (1, 2.0), (2, 0.0)].into_iter().collect();
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(0), None);
        assert_eq!(v.get(1), Some(2.0));
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0)]);
        assert!((v.norm() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_empty_is_zero() {
        let empty = SparseVector::new();
        let v: SparseVector = vec![(3, 1.0)].into_iter().collect();
        assert_eq!(empty.cosine(&v), 0.0);
        assert_eq!(v.cosine(&empty), 0.0);
        assert_eq!(empty.cosine(&empty), 0.0);
    }

    #[test]
    fn cosine_is_symmetric_and_bounded() {
        let a: SparseVector = vec![(0, 0.3), (1, 0.1), (4, 0.7)].into_iter().collect();
        let b: SparseVector = vec![(1, 0.2), (4, 0.05)].into_iter().collect();
        let ab = a.cosine(&b);
        assert_eq!(ab, b.cosine(&a));
        assert!((0.0..=1.0).contains(&ab));
        assert!((a.cosine(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_weights_on_shared_terms_still_give_nonnegative_cosine() {
        let a: SparseVector = vec![(0, -0.2), (1, 0.4)].into_iter().collect();
        let b: SparseVector = vec![(0, -0.1), (2, 0.9)].into_iter().collect();
        assert!(a.cosine(&b) >= 0.0);
    }
}
