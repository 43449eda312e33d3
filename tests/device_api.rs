//! DeviceClient against a mock canvas device
//!
//! The mock reproduces the firmware's quirks: JSON bodies labeled
//! `text/json`/`text/javascript`, stray output around them, and upload
//! responses carrying a directory path instead of the final resource path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use eink_canvas::sync::RetryPolicy;
use eink_canvas::{DeviceClient, PlayType};

#[derive(Default)]
struct MockState {
    upload_calls: AtomicUsize,
    last_query: Mutex<HashMap<String, String>>,
    last_show_body: Mutex<Option<serde_json::Value>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn mislabeled(body: &'static str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], body)
}

#[tokio::test]
async fn device_info_parses_mislabeled_wrapped_body() {
    let app = Router::new().route(
        "/deviceInfo",
        get(|| async { mislabeled("boot noise {\"name\":\"canvas\",\"version\":\"1.2.0\",\"battery\":87}\r\n") }),
    );
    let client = DeviceClient::new(&serve(app).await);

    let info = client.device_info().await.unwrap();
    assert_eq!(info.name.as_deref(), Some("canvas"));
    assert_eq!(info.version.as_deref(), Some("1.2.0"));
    assert_eq!(info.battery, Some(87));
}

#[tokio::test]
async fn upload_reconciles_directory_path_with_trailing_slash() {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route(
            "/upload",
            post(
                |State(state): State<Arc<MockState>>,
                 Query(query): Query<HashMap<String, String>>,
                 _body: axum::body::Bytes| async move {
                    state.upload_calls.fetch_add(1, Ordering::SeqCst);
                    *state.last_query.lock() = query;
                    mislabeled("{\"status\":100,\"path\":\"/gallerys/default/\"}")
                },
            ),
        )
        .with_state(state.clone());
    let client = DeviceClient::new(&serve(app).await);

    let path = client
        .upload_image(vec![0xFF, 0xD8], "a.jpg", "default", false)
        .await
        .unwrap();

    assert_eq!(path, "/gallerys/default/a.jpg");
    let query = state.last_query.lock().clone();
    assert_eq!(query.get("filename").unwrap(), "a.jpg");
    assert_eq!(query.get("gallery").unwrap(), "default");
    assert_eq!(query.get("show_now").unwrap(), "0");
}

#[tokio::test]
async fn upload_reconciles_directory_path_without_trailing_slash() {
    let app = Router::new().route(
        "/upload",
        post(|| async { mislabeled("{\"status\":100,\"path\":\"/gallerys/default\"}") }),
    );
    let client = DeviceClient::new(&serve(app).await);

    let path = client
        .upload_image(vec![1], "a.jpg", "default", false)
        .await
        .unwrap();
    assert_eq!(path, "/gallerys/default/a.jpg");
}

#[tokio::test]
async fn upload_with_garbage_body_still_succeeds_on_200() {
    let app = Router::new().route("/upload", post(|| async { mislabeled("<ok/>") }));
    let client = DeviceClient::new(&serve(app).await);

    let path = client
        .upload_image(vec![1], "b.jpg", "art", true)
        .await
        .unwrap();
    assert_eq!(path, "/gallerys/art/b.jpg");
}

#[tokio::test]
async fn upload_rejection_is_terminal_and_not_retried() {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route(
            "/upload",
            post(|State(state): State<Arc<MockState>>| async move {
                state.upload_calls.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "store full")
            }),
        )
        .with_state(state.clone());
    let client =
        DeviceClient::new(&serve(app).await).with_retry_policy(RetryPolicy::immediate(3));

    let result = client.upload_image(vec![1], "a.jpg", "default", false).await;

    assert!(result.is_err());
    assert_eq!(state.upload_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_backs_off_one_then_two_seconds() {
    // Reserve a port, then close it so every connect is refused
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DeviceClient::new(&format!("http://{addr}"));
    let start = tokio::time::Instant::now();
    let result = client.upload_image(vec![1], "a.jpg", "default", false).await;

    assert!(result.is_err());
    // Three attempts with 1s and 2s of backoff between them
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn existing_photos_uses_the_single_large_page() {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route(
            "/gallery",
            get(
                |State(state): State<Arc<MockState>>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    *state.last_query.lock() = query;
                    (
                        [(header::CONTENT_TYPE, "text/json")],
                        "{\"data\":[{\"name\":\"a.jpg\",\"size\":123,\"time\":\"2024\"},{\"name\":\"b.jpg\"}],\"total\":2,\"offset\":0,\"limit\":1000}",
                    )
                },
            ),
        )
        .with_state(state.clone());
    let client = DeviceClient::new(&serve(app).await);

    let existing = client.existing_photos("default").await;

    assert_eq!(existing.len(), 2);
    assert!(existing.contains("a.jpg"));
    let query = state.last_query.lock().clone();
    assert_eq!(query.get("gallery_name").unwrap(), "default");
    assert_eq!(query.get("offset").unwrap(), "0");
    assert_eq!(query.get("limit").unwrap(), "1000");
}

#[tokio::test]
async fn existing_photos_is_empty_when_the_device_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DeviceClient::new(&format!("http://{addr}"));
    assert!(client.existing_photos("default").await.is_empty());
}

#[tokio::test]
async fn galleries_parse_despite_text_json_label() {
    let app = Router::new().route(
        "/gallery/list",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/json")],
                "[{\"name\":\"default\"},{\"name\":\"art\"}]",
            )
        }),
    );
    let client = DeviceClient::new(&serve(app).await);

    let galleries = client.galleries().await;
    let names: Vec<&str> = galleries.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["default", "art"]);
}

#[tokio::test]
async fn whistle_uses_get_and_show_next_uses_post() {
    let app = Router::new()
        .route("/whistle", get(|| async { "ok" }))
        .route("/showNext", post(|| async { "ok" }));
    let client = DeviceClient::new(&serve(app).await);

    assert!(client.whistle().await);
    assert!(client.show_next().await);
}

#[tokio::test]
async fn show_image_sends_the_full_path_for_single_play() {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route(
            "/show",
            post(
                |State(state): State<Arc<MockState>>, Json(body): Json<serde_json::Value>| async move {
                    *state.last_show_body.lock() = Some(body);
                    "ok"
                },
            ),
        )
        .with_state(state.clone());
    let client = DeviceClient::new(&serve(app).await);

    assert!(
        client
            .show_image("/gallerys/art/x.jpg", PlayType::Single, None, 99_999)
            .await
    );
    let body = state.last_show_body.lock().clone().unwrap();
    assert_eq!(body["play_type"], 0);
    assert_eq!(body["image"], "/gallerys/art/x.jpg");
    assert!(body.get("gallery").is_none());
}

#[tokio::test]
async fn show_image_slideshow_sends_filename_gallery_and_duration() {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route(
            "/show",
            post(
                |State(state): State<Arc<MockState>>, Json(body): Json<serde_json::Value>| async move {
                    *state.last_show_body.lock() = Some(body);
                    "ok"
                },
            ),
        )
        .with_state(state.clone());
    let client = DeviceClient::new(&serve(app).await);

    assert!(
        client
            .show_image_by_name("x.jpg", "art", PlayType::Slideshow, Some(1), 600)
            .await
    );
    let body = state.last_show_body.lock().clone().unwrap();
    assert_eq!(body["play_type"], 1);
    assert_eq!(body["image"], "x.jpg");
    assert_eq!(body["gallery"], "art");
    assert_eq!(body["duration"], 600);
    assert_eq!(body["dither"], 1);
}
