//! Per-candidate similarity signals against a set of selected movies.
//!
//! Every function returns one score per catalog index, selected indices
//! included. Exclusion of the selection is left to the ranker.

use crate::{MovieRecord, SparseVector};
use std::collections::HashSet;

/// Max cosine between each candidate's overview vector and any selected one.
pub fn plot_similarity(vectors: &[SparseVector], selected: &[usize]) -> Vec<f64> {
    let chosen: Vec<&SparseVector> = selected.iter().filter_map(|&i| vectors.get(i)).collect();
    vectors
        .iter()
        .map(|candidate| chosen.iter().map(|s| candidate.cosine(s)).fold(0.0, f64::max))
        .collect()
}

/// Jaccard index of each candidate's genres against the union of selected genres.
pub fn genre_similarity(movies: &[MovieRecord], selected: &[usize]) -> Vec<f64> {
    let pool: HashSet<&str> = selected_pool(movies, selected, |m| m.genres.iter().map(String::as_str).collect());
    movies
        .iter()
        .map(|m| {
            let genres: HashSet<&str> = m.genres.iter().map(String::as_str).collect();
            if genres.is_empty() || pool.is_empty() {
                return 0.0;
            }
            let inter = genres.intersection(&pool).count();
            let union = genres.union(&pool).count();
            inter as f64 / union as f64
        })
        .collect()
}

/// 1.0 when a candidate shares a director with any selected movie.
pub fn director_similarity(movies: &[MovieRecord], selected: &[usize]) -> Vec<f64> {
    let directors: HashSet<&str> = selected_pool(movies, selected, |m| m.director_name().into_iter().collect());
    movies
        .iter()
        .map(|m| match m.director_name() {
            Some(d) if directors.contains(d) => 1.0,
            _ => 0.0,
        })
        .collect()
}

/// Share of a candidate's top-billed cast found in the selected movies' top-billed cast.
///
/// The denominator is the candidate's own top-cast size, so this is a
/// containment measure rather than a Jaccard index.
pub fn cast_similarity(movies: &[MovieRecord], selected: &[usize]) -> Vec<f64> {
    let pool: HashSet<&str> = selected_pool(movies, selected, |m| m.top_cast().iter().map(String::as_str).collect());
    movies
        .iter()
        .map(|m| {
            let cast: HashSet<&str> = m.top_cast().iter().map(String::as_str).collect();
            if cast.is_empty() || pool.is_empty() {
                return 0.0;
            }
            cast.intersection(&pool).count() as f64 / cast.len() as f64
        })
        .collect()
}

fn selected_pool<'a, F>(movies: &'a [MovieRecord], selected: &[usize], extract: F) -> HashSet<&'a str>
where
    F: Fn(&'a MovieRecord) -> Vec<&'a str>,
{
    selected
        .iter()
        .filter_map(|&i| movies.get(i))
        .flat_map(extract)
        .collect()
}
