use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reelmatch_core::persist::{save_snapshot, SnapshotPaths};
use reelmatch_core::{MovieRecord, Recommender};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

fn movie(title: &str, director: &str, genres: &[&str], overview: &str) -> MovieRecord {
    MovieRecord {
        director: Some(director.to_string()),
        genres: genres.iter().map(|s| s.to_string()).collect(),
        overview: Some(overview.to_string()),
        ..MovieRecord::new(title)
    }
}

fn write_snapshot(dir: &std::path::Path, movies: Vec<MovieRecord>, created_at: &str) {
    let rec = Recommender::new(movies);
    save_snapshot(&SnapshotPaths::new(dir), &rec, created_at.into()).unwrap();
}

fn tiny_catalog() -> Vec<MovieRecord> {
    vec![
        movie("A", "Nolan", &["sci-fi", "thriller"], "a dream heist"),
        movie("B", "Nolan", &["sci-fi"], "a dream within a dream"),
        movie("C", "Bay", &["action"], "explosions and robots"),
    ]
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn recommend_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog(), "2024-01-01T00:00:00Z");
    let app = reelmatch_server::build_app_with_token(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (status, body) = call(app, post_json("/recommend", json!({ "titles": ["A", "Nope"], "k": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["selected"], json!(["A"]));
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["movie"]["title"], "B");
    assert!(arr[0]["explanation"].as_str().unwrap().contains("Same director: Nolan"));
}

#[tokio::test]
async fn unknown_selection_is_empty_not_error() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog(), "2024-01-01T00:00:00Z");
    let app = reelmatch_server::build_app_with_token(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (status, body) = call(app, post_json("/recommend", json!({ "titles": ["Nope"] }))).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["results"].as_array().unwrap().is_empty());
    assert!(json["selected"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn movie_lookup_and_listing() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog(), "2024-01-01T00:00:00Z");
    let app = reelmatch_server::build_app_with_token(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (status, body) = call(app.clone(), Request::get("/movies").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["titles"], json!(["A", "B", "C"]));

    let (status, body) = call(app.clone(), Request::get("/movie/C").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["director"], "Bay");

    let (status, _) = call(app, Request::get("/movie/Z").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_requires_token_and_swaps_catalog() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog(), "2024-01-01T00:00:00Z");
    let app = reelmatch_server::build_app_with_token(dir.path().to_string_lossy().to_string(), Some("secret".into())).unwrap();

    let (status, _) = call(app.clone(), Request::post("/catalog/reload").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut movies = tiny_catalog();
    movies.push(movie("D", "Nolan", &["sci-fi"], "a heist in orbit"));
    write_snapshot(dir.path(), movies, "2024-02-01T00:00:00Z");

    let req = Request::post("/catalog/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, body) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    let meta: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(meta["num_movies"], 4);

    let (_, body) = call(app, Request::get("/movies").body(Body::empty()).unwrap()).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["snapshot_created_at"], "2024-02-01T00:00:00Z");
}
