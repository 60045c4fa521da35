use crate::{MovieRecord, Signals};
use std::collections::HashSet;

const GENRE_GATE: f64 = 0.5;
const DIRECTOR_GATE: f64 = 0.9;
const CAST_GATE: f64 = 0.2;
const PLOT_GATE: f64 = 0.3;
const SHOWN_GENRES: usize = 2;

/// Which selected movie a candidate is credited to, plus the largest genre
/// overlap found with any selected movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution<'a> {
    pub matched: &'a MovieRecord,
    pub genre_overlap: Vec<&'a str>,
}

/// Single pass over the selection in input order. The first director match
/// wins outright and freezes cast and genre attribution, though the best genre
/// overlap keeps updating over the whole selection. Otherwise the last cast
/// overlap wins, then the selected movie that strictly improved the genre
/// overlap without sharing cast, then the first selected movie. Returns `None`
/// for an empty selection.
pub fn attribute<'a>(candidate: &'a MovieRecord, selected: &[&'a MovieRecord]) -> Option<Attribution<'a>> {
    let first = *selected.first()?;
    let cand_cast: HashSet<&str> = candidate.top_cast().iter().map(String::as_str).collect();

    let mut director_match: Option<&MovieRecord> = None;
    let mut cast_match: Option<&MovieRecord> = None;
    let mut genre_match: Option<&MovieRecord> = None;
    let mut best_overlap: Vec<&str> = Vec::new();

    for &sel in selected {
        let overlap = shared_genres(candidate, sel);
        let improved = overlap.len() > best_overlap.len();
        if improved {
            best_overlap = overlap;
        }

        if director_match.is_some() {
            continue;
        }
        if let (Some(cd), Some(sd)) = (candidate.director_name(), sel.director_name()) {
            if cd == sd {
                director_match = Some(sel);
                continue;
            }
        }

        let shares_cast = sel.top_cast().iter().any(|c| cand_cast.contains(c.as_str()));
        if shares_cast {
            cast_match = Some(sel);
        } else if improved {
            genre_match = Some(sel);
        }
    }

    let matched = director_match.or(cast_match).or(genre_match).unwrap_or(first);
    Some(Attribution { matched, genre_overlap: best_overlap })
}

/// Candidate genres also present in `selected`, in the candidate's order.
fn shared_genres<'a>(candidate: &'a MovieRecord, selected: &MovieRecord) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    candidate
        .genres
        .iter()
        .map(String::as_str)
        .filter(|g| selected.genres.iter().any(|s| s == g) && seen.insert(*g))
        .collect()
}

/// Reason clauses for a candidate, gated on normalized signal strength.
pub fn reasons(candidate: &MovieRecord, genre_overlap: &[&str], signals: &Signals) -> Vec<String> {
    let norm = signals.normalized();
    let mut out = Vec::new();
    if !genre_overlap.is_empty() && norm.genre > GENRE_GATE {
        let shown: Vec<&str> = genre_overlap.iter().take(SHOWN_GENRES).copied().collect();
        out.push(format!("Shares genres: {}", shown.join(", ")));
    }
    if norm.director > DIRECTOR_GATE {
        out.push(format!("Same director: {}", candidate.director_name().unwrap_or_default()));
    }
    if norm.cast > CAST_GATE {
        out.push("Features similar actors".to_string());
    }
    if norm.plot > PLOT_GATE {
        out.push("Similar themes and storytelling".to_string());
    }
    if out.is_empty() {
        out.push("Strong overall match based on multiple factors".to_string());
    }
    out
}

/// "Because you liked {title} → {reason}; {reason}".
pub fn explain(candidate: &MovieRecord, selected: &[&MovieRecord], signals: &Signals) -> String {
    match attribute(candidate, selected) {
        Some(attr) => format!(
            "Because you liked {} → {}",
            attr.matched.title,
            reasons(candidate, &attr.genre_overlap, signals).join("; ")
        ),
        None => reasons(candidate, &[], signals).join("; "),
    }
}
