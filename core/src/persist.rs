use crate::{MovieRecord, Recommender, Vectorizer};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_movies: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn catalog(&self) -> PathBuf { self.root.join("catalog.bin") }
    fn vectorizer(&self) -> PathBuf { self.root.join("vectorizer.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_catalog(paths: &SnapshotPaths, movies: &[MovieRecord]) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.catalog(), movies)
}

pub fn load_catalog(paths: &SnapshotPaths) -> Result<Vec<MovieRecord>> {
    read_bin(&paths.catalog())
}

pub fn save_vectorizer(paths: &SnapshotPaths, vectorizer: &Vectorizer) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.vectorizer(), vectorizer)
}

pub fn load_vectorizer(paths: &SnapshotPaths) -> Result<Vectorizer> {
    read_bin(&paths.vectorizer())
}

pub fn save_meta(paths: &SnapshotPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("open {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write a built recommender as a snapshot directory.
pub fn save_snapshot(paths: &SnapshotPaths, rec: &Recommender, created_at: String) -> Result<MetaFile> {
    save_catalog(paths, rec.movies())?;
    save_vectorizer(paths, rec.vectorizer())?;
    let meta = MetaFile {
        num_movies: rec.len() as u32,
        num_terms: rec.vectorizer().num_terms() as u32,
        created_at,
        version: SNAPSHOT_VERSION,
    };
    save_meta(paths, &meta)?;
    Ok(meta)
}

/// Restore a recommender from a snapshot directory without rebuilding its tables.
pub fn load_snapshot(paths: &SnapshotPaths) -> Result<(Recommender, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        bail!("unsupported snapshot version {} (expected {})", meta.version, SNAPSHOT_VERSION);
    }
    let movies = load_catalog(paths)?;
    let vectorizer = load_vectorizer(paths)?;
    if movies.len() != meta.num_movies as usize {
        bail!("meta.json lists {} movies but catalog holds {}", meta.num_movies, movies.len());
    }
    let rec = Recommender::from_parts(movies, vectorizer)?;
    tracing::info!(root = %paths.root.display(), num_movies = meta.num_movies, "snapshot loaded");
    Ok((rec, meta))
}

fn write_bin<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn read_bin<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(f))?;
    Ok(value)
}
