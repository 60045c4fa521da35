use serde::{Deserialize, Serialize};

pub const PLOT_WEIGHT: f64 = 0.40;
pub const GENRE_WEIGHT: f64 = 0.30;
pub const DIRECTOR_WEIGHT: f64 = 0.15;
pub const CAST_WEIGHT: f64 = 0.15;

/// Score given to selected movies so they can never be ranked.
pub const EXCLUDED: f64 = -1.0;

pub const DEFAULT_COUNT: usize = 5;

/// Weighted contribution of each signal for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub plot: f64,
    pub genre: f64,
    pub director: f64,
    pub cast: f64,
}

impl Signals {
    pub fn weighted(plot: f64, genre: f64, director: f64, cast: f64) -> Self {
        Self {
            plot: plot * PLOT_WEIGHT,
            genre: genre * GENRE_WEIGHT,
            director: director * DIRECTOR_WEIGHT,
            cast: cast * CAST_WEIGHT,
        }
    }

    pub fn combined(&self) -> f64 { self.plot + self.genre + self.director + self.cast }

    /// Contributions divided back by their weights, roughly the raw [0, 1] similarities.
    pub fn normalized(&self) -> Signals {
        Signals {
            plot: self.plot / PLOT_WEIGHT,
            genre: self.genre / GENRE_WEIGHT,
            director: self.director / DIRECTOR_WEIGHT,
            cast: self.cast / CAST_WEIGHT,
        }
    }
}

/// Rank catalog indices by combined score.
///
/// Selected indices are pinned to [`EXCLUDED`], non-positive scores are dropped,
/// and ties keep catalog order. Returns at most `count` `(index, score)` pairs.
pub fn rank(combined: &[f64], selected: &[usize], count: usize) -> Vec<(usize, f64)> {
    let mut scores = combined.to_vec();
    for &idx in selected {
        if let Some(s) = scores.get_mut(idx) {
            *s = EXCLUDED;
        }
    }
    let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().filter(|(_, s)| *s > 0.0).collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(count);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let s = Signals::weighted(1.0, 1.0, 1.0, 1.0);
        assert!((s.combined() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_recovers_raw_scale() {
        let n = Signals::weighted(0.5, 0.25, 1.0, 0.2).normalized();
        assert!((n.plot - 0.5).abs() < 1e-12);
        assert!((n.genre - 0.25).abs() < 1e-12);
        assert!(n.director > 0.9);
        assert!((n.cast - 0.2).abs() < 1e-12);
    }

    #[test]
    fn rank_excludes_selected_and_non_positive() {
        let ranked = rank(&[0.9, 0.0, 0.3, 0.5], &[0], 10);
        assert_eq!(ranked, vec![(3, 0.5), (2, 0.3)]);
    }

    #[test]
    fn rank_keeps_catalog_order_on_ties() {
        let ranked = rank(&[0.2, 0.4, 0.2, 0.4], &[], 3);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 3, 0]);
    }

    #[test]
    fn rank_truncates() {
        assert_eq!(rank(&[0.1, 0.2, 0.3], &[], 1), vec![(2, 0.3)]);
        assert!(rank(&[0.1, 0.2], &[], 0).is_empty());
    }
}
