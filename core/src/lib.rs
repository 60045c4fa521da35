pub mod engine;
pub mod explain;
pub mod persist;
pub mod ranker;
pub mod similarity;
pub mod tokenizer;
pub mod vector;
pub mod vectorizer;

use serde::{Deserialize, Serialize};

pub use engine::{Recommendation, Recommender};
pub use ranker::Signals;
pub use vector::SparseVector;
pub use vectorizer::Vectorizer;

pub type TermId = u32;

/// Number of leading cast entries that take part in cast similarity.
pub const TOP_CAST: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: Option<u64>,
    pub title: String,
    pub year: Option<i32>,
    /// Plot summary, the only input to plot similarity.
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    /// Billing order; only the first [`TOP_CAST`] names are compared.
    pub cast: Vec<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub poster_url: Option<String>,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn top_cast(&self) -> &[String] {
        &self.cast[..self.cast.len().min(TOP_CAST)]
    }

    /// Director name, treating an empty string as absent.
    pub fn director_name(&self) -> Option<&str> {
        self.director.as_deref().filter(|d| !d.is_empty())
    }
}
