#![allow(dead_code)]

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// The example report: one song, one artist, one album.
pub fn example_results() -> Value {
    json!({
        "total_plays": 1000,
        "total_time_hours": 83.2,
        "total_files": 50,
        "top_songs": [{"rank": 1, "artist": "A", "title": "T", "album": "Alb", "plays": 99}],
        "top_artists": [{"rank": 1, "artist": "A", "plays": 99}],
        "top_albums": [{"rank": 1, "album": "Alb", "artist": "A", "plays": 99}]
    })
}

/// What the fake service saw in the last upload.
#[derive(Debug, Clone, Default)]
pub struct Received {
    pub field_names: Vec<String>,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServerState {
    results: Value,
    received: Arc<Mutex<Option<Received>>>,
}

/// Mirrors the statistics service: one multipart file field, XML only,
/// JSON body on both success and failure.
async fn handle_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut received = Received::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "wrappedUpload" {
            received.filename = field.file_name().map(str::to_string);
            received.bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        }
        received.field_names.push(name);
    }
    *state.received.lock().await = Some(received.clone());

    let Some(filename) = received.filename else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "No file part in the request"})),
        );
    };
    if !filename.ends_with(".xml") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Please upload an XML file"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "filename": filename, "results": state.results})),
    )
}

async fn handle_garbage() -> &'static str {
    "<html>Internal Server Error</html>"
}

pub async fn spawn_stats_server(
    results: Value,
) -> (String, Arc<Mutex<Option<Received>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(None));
    let state = ServerState {
        results,
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route("/", post(handle_upload))
        .route("/garbage/", post(handle_garbage))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), received)
}

/// An address nothing is listening on.
pub fn unreachable_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}
