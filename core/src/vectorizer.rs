use crate::tokenizer::tokenize;
use crate::{MovieRecord, SparseVector, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Frozen TF-IDF tables for one catalog: vocabulary, document frequencies,
/// idf weights and one document vector per movie (aligned by catalog index).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vectorizer {
    pub vocabulary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub idf: Vec<f64>,
    pub vectors: Vec<SparseVector>,
}

impl Vectorizer {
    pub fn build(movies: &[MovieRecord]) -> Self {
        let mut vocabulary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut counts_per_doc: Vec<HashMap<TermId, u32>> = Vec::with_capacity(movies.len());
        let mut totals: Vec<usize> = Vec::with_capacity(movies.len());

        for movie in movies {
            let tokens = tokenize(movie.overview.as_deref().unwrap_or_default());
            let mut counts: HashMap<TermId, u32> = HashMap::new();
            let mut seen_in_doc: HashSet<TermId> = HashSet::new();
            totals.push(tokens.len());
            for token in tokens {
                let next_id = vocabulary.len() as TermId;
                let tid = *vocabulary.entry(token).or_insert_with(|| {
                    df.push(0);
                    next_id
                });
                *counts.entry(tid).or_insert(0) += 1;
                if seen_in_doc.insert(tid) {
                    df[tid as usize] += 1;
                }
            }
            counts_per_doc.push(counts);
        }

        let n = movies.len() as f64;
        let idf: Vec<f64> = df.iter().map(|&d| (n / (1.0 + d as f64)).ln()).collect();

        let vectors = counts_per_doc
            .into_iter()
            .zip(totals)
            .map(|(counts, total)| {
                counts
                    .into_iter()
                    .map(|(tid, c)| (tid, (c as f64 / total as f64) * idf[tid as usize]))
                    .collect::<SparseVector>()
            })
            .collect();

        tracing::debug!(num_movies = movies.len(), num_terms = vocabulary.len(), "built tf-idf tables");
        Self { vocabulary, df, idf, vectors }
    }

    pub fn num_terms(&self) -> usize { self.vocabulary.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.vocabulary.get(term).copied() }

    pub fn idf_of(&self, term: &str) -> Option<f64> {
        self.term_id(term).and_then(|tid| self.idf.get(tid as usize).copied())
    }

    pub fn vector(&self, idx: usize) -> Option<&SparseVector> { self.vectors.get(idx) }
}
