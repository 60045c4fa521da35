use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reelmatch_core::persist::{load_snapshot, save_snapshot, SnapshotPaths};
use reelmatch_core::ranker::DEFAULT_COUNT;
use reelmatch_core::{MovieRecord, Recommender};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputMovie {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    /// Either a number or a date-like string such as "1994" or "1994-09-23".
    #[serde(default)]
    year: Option<serde_json::Value>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    cast: Option<Vec<String>>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    vote_count: Option<u64>,
    #[serde(default, alias = "poster_path")]
    poster_url: Option<String>,
}

#[derive(Parser)]
#[command(name = "reelmatch-indexer")]
#[command(about = "Build movie catalog snapshots and query them offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a snapshot from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output snapshot directory
        #[arg(long)]
        output: String,
        /// Drop movies with fewer votes than this (movies without a vote count are kept)
        #[arg(long)]
        min_votes: Option<u64>,
    },
    /// Recommend movies from a snapshot
    Recommend {
        /// Snapshot directory path
        #[arg(long, default_value = "./index")]
        index: String,
        /// A liked title; repeat for several
        #[arg(long = "title", required = true)]
        titles: Vec<String>,
        /// Number of recommendations
        #[arg(short, long, default_value_t = DEFAULT_COUNT)]
        k: usize,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, min_votes } => build_snapshot(&input, &output, min_votes),
        Commands::Recommend { index, titles, k, json } => recommend(&index, &titles, k, json),
    }
}

fn build_snapshot(input: &str, output: &str, min_votes: Option<u64>) -> Result<()> {
    let movies = load_movies(Path::new(input), min_votes)?;
    tracing::info!(num_movies = movies.len(), "ingested movies");

    let rec = Recommender::new(movies);
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    let meta = save_snapshot(&SnapshotPaths::new(output), &rec, created_at)?;

    tracing::info!(output, num_movies = meta.num_movies, num_terms = meta.num_terms, "snapshot build complete");
    Ok(())
}

fn recommend(index: &str, titles: &[String], k: usize, json: bool) -> Result<()> {
    let (rec, _meta) = load_snapshot(&SnapshotPaths::new(index))?;
    let results = rec.recommend(titles, k);
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }
    for (rank, r) in results.iter().enumerate() {
        let year = r.movie.year.map(|y| format!(" ({y})")).unwrap_or_default();
        println!("{}. {}{} [{:.0}% match]", rank + 1, r.movie.title, year, r.score * 100.0);
        println!("   {}", r.explanation);
    }
    Ok(())
}

/// Read every JSON/JSONL file under `input` into catalog order.
///
/// Records without a title are skipped; duplicate titles keep the first record.
fn load_movies(input: &Path, min_votes: Option<u64>) -> Result<Vec<MovieRecord>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }

    let mut raw: Vec<InputMovie> = Vec::new();
    for file in &files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(file, &mut raw)?;
        } else {
            read_json(file, &mut raw)?;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut movies = Vec::with_capacity(raw.len());
    for doc in raw {
        let Some(movie) = normalize(doc) else { continue };
        if let (Some(min), Some(votes)) = (min_votes, movie.vote_count) {
            if votes < min {
                continue;
            }
        }
        if !seen.insert(movie.title.clone()) {
            tracing::warn!(title = %movie.title, "duplicate title skipped");
            continue;
        }
        movies.push(movie);
    }
    Ok(movies)
}

fn read_jsonl(file: &Path, out: &mut Vec<InputMovie>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    for (lineno, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputMovie = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<InputMovie>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v).with_context(|| format!("record in {}", file.display()))?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "ignoring non-object JSON file"),
    }
    Ok(())
}

fn normalize(doc: InputMovie) -> Option<MovieRecord> {
    let title = doc.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let Some(title) = title else {
        tracing::warn!(id = ?doc.id, "record without title skipped");
        return None;
    };
    Some(MovieRecord {
        id: doc.id,
        title,
        year: doc.year.as_ref().and_then(parse_year),
        overview: doc.overview.filter(|o| !o.trim().is_empty()),
        genres: doc.genres.unwrap_or_default(),
        director: doc.director.filter(|d| !d.trim().is_empty()),
        cast: doc.cast.unwrap_or_default(),
        rating: doc.rating,
        vote_count: doc.vote_count,
        poster_url: doc.poster_url,
    })
}

fn parse_year(v: &serde_json::Value) -> Option<i32> {
    match v {
        serde_json::Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        serde_json::Value::String(s) => s.get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    }
}
