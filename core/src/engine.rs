use crate::explain::explain;
use crate::ranker::{rank, Signals};
use crate::similarity::{cast_similarity, director_similarity, genre_similarity, plot_similarity};
use crate::{MovieRecord, Vectorizer};
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<'a> {
    pub movie: &'a MovieRecord,
    pub score: f64,
    pub explanation: String,
    pub signals: Signals,
}

/// Content-based recommender over a frozen catalog.
///
/// All tables are built once in [`Recommender::new`]; queries only read them,
/// so a shared `&Recommender` can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    movies: Vec<MovieRecord>,
    vectorizer: Vectorizer,
    by_title: HashMap<String, usize>,
}

impl Recommender {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        let vectorizer = Vectorizer::build(&movies);
        let by_title = title_index(&movies);
        tracing::info!(num_movies = movies.len(), num_terms = vectorizer.num_terms(), "recommender ready");
        Self { movies, vectorizer, by_title }
    }

    /// Reassemble from tables built earlier, e.g. a loaded snapshot.
    pub fn from_parts(movies: Vec<MovieRecord>, vectorizer: Vectorizer) -> Result<Self> {
        if movies.len() != vectorizer.vectors.len() {
            bail!("vectorizer holds {} vectors for {} movies", vectorizer.vectors.len(), movies.len());
        }
        let by_title = title_index(&movies);
        Ok(Self { movies, vectorizer, by_title })
    }

    pub fn movies(&self) -> &[MovieRecord] { &self.movies }

    pub fn vectorizer(&self) -> &Vectorizer { &self.vectorizer }

    pub fn len(&self) -> usize { self.movies.len() }

    pub fn is_empty(&self) -> bool { self.movies.is_empty() }

    pub fn get(&self, title: &str) -> Option<&MovieRecord> {
        self.index_of(title).map(|i| &self.movies[i])
    }

    pub fn index_of(&self, title: &str) -> Option<usize> { self.by_title.get(title).copied() }

    /// Catalog indices for the known titles, in input order, without repeats.
    pub fn resolve<S: AsRef<str>>(&self, titles: &[S]) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::with_capacity(titles.len());
        for t in titles {
            if let Some(idx) = self.index_of(t.as_ref()) {
                if !out.contains(&idx) {
                    out.push(idx);
                }
            }
        }
        out
    }

    /// Per-candidate weighted signals for every catalog index.
    pub fn score(&self, selected: &[usize]) -> Vec<Signals> {
        let plot = plot_similarity(&self.vectorizer.vectors, selected);
        let genre = genre_similarity(&self.movies, selected);
        let director = director_similarity(&self.movies, selected);
        let cast = cast_similarity(&self.movies, selected);
        (0..self.movies.len())
            .map(|i| Signals::weighted(plot[i], genre[i], director[i], cast[i]))
            .collect()
    }

    /// Up to `count` movies most similar to the selected titles, best first.
    ///
    /// Unknown titles are ignored; if none are known the result is empty.
    pub fn recommend<S: AsRef<str>>(&self, titles: &[S], count: usize) -> Vec<Recommendation<'_>> {
        let selected = self.resolve(titles);
        if selected.is_empty() {
            tracing::debug!(requested = titles.len(), "no selected title found in catalog");
            return Vec::new();
        }

        let signals = self.score(&selected);
        let combined: Vec<f64> = signals.iter().map(Signals::combined).collect();
        let ranked = rank(&combined, &selected, count);
        let chosen: Vec<&MovieRecord> = selected.iter().map(|&i| &self.movies[i]).collect();

        tracing::debug!(selected = selected.len(), hits = ranked.len(), "recommendation query");
        ranked
            .into_iter()
            .map(|(idx, score)| {
                let movie = &self.movies[idx];
                Recommendation { movie, score, explanation: explain(movie, &chosen, &signals[idx]), signals: signals[idx] }
            })
            .collect()
    }
}

/// First occurrence of a title wins.
fn title_index(movies: &[MovieRecord]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(movies.len());
    for (i, m) in movies.iter().enumerate() {
        map.entry(m.title.clone()).or_insert(i);
    }
    map
}
