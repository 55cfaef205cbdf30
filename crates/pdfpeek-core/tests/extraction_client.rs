//! Integration tests for [`ExtractionClient`] against an in-process axum
//! server that mimics the `/api/clean-pdf` endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use pdfpeek_core::extract::GENERIC_FAILURE;
use pdfpeek_core::{ExtractError, ExtractionClient, TextExtractor};

/// What the server saw in one upload.
#[derive(Debug, Clone)]
struct Upload {
    field: String,
    file_name: String,
    content_type: String,
    len: usize,
}

type Seen = Arc<Mutex<Vec<Upload>>>;

async fn clean_pdf(State(seen): State<Seen>, mut multipart: Multipart) -> Response {
    let mut file_name = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let fname = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field.bytes().await.unwrap_or_default();
        seen.lock().unwrap().push(Upload {
            field: name,
            file_name: fname.clone(),
            content_type,
            len: data.len(),
        });
        file_name = fname;
    }

    match file_name.as_str() {
        "report.pdf" => axum::Json(serde_json::json!({
            "text": "Quarterly report\nRevenue up.",
            "metadata": { "pages": 3 }
        }))
        .into_response(),
        "blank.pdf" => axum::Json(serde_json::json!({ "text": "" })).into_response(),
        "broken.pdf" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": "extraction failed" })),
        )
            .into_response(),
        "proxy.pdf" => (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response(),
        "slow.pdf" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            axum::Json(serde_json::json!({ "text": "late" })).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({ "error": "No file provided" })),
        )
            .into_response(),
    }
}

async fn spawn_server() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/clean-pdf", post(clean_pdf))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn client(addr: SocketAddr, timeout: Duration) -> ExtractionClient {
    ExtractionClient::new(format!("http://{}/api/clean-pdf", addr), timeout)
}

fn write_pdf(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"%PDF-1.4\n1 0 obj <<>> endobj\n%%EOF\n").unwrap();
    path
}

#[tokio::test]
async fn uploads_file_field_and_parses_text() {
    let (addr, seen) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, "report.pdf");

    let extraction = client(addr, Duration::from_secs(10))
        .extract(&path)
        .await
        .expect("extraction should succeed");
    assert_eq!(extraction.text, "Quarterly report\nRevenue up.");
    assert_eq!(extraction.page_count, Some(3));

    let uploads = seen.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "file");
    assert_eq!(uploads[0].file_name, "report.pdf");
    assert_eq!(uploads[0].content_type, "application/pdf");
    assert_eq!(uploads[0].len, std::fs::metadata(&path).unwrap().len() as usize);
}

#[tokio::test]
async fn empty_text_without_metadata() {
    let (addr, _) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let extraction = client(addr, Duration::from_secs(10))
        .extract(&write_pdf(&dir, "blank.pdf"))
        .await
        .unwrap();
    assert_eq!(extraction.text, "");
    assert_eq!(extraction.page_count, None);
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (addr, _) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let err = client(addr, Duration::from_secs(10))
        .extract(&write_pdf(&dir, "broken.pdf"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExtractError::Server {
            status: 500,
            message: "extraction failed".into()
        }
    );
}

#[tokio::test]
async fn non_json_error_is_generic() {
    let (addr, _) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let err = client(addr, Duration::from_secs(10))
        .extract(&write_pdf(&dir, "proxy.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), GENERIC_FAILURE);
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let (addr, _) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let err = client(addr, Duration::from_millis(200))
        .extract(&write_pdf(&dir, "slow.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Http(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let dir = tempfile::tempdir().unwrap();
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(addr, Duration::from_secs(2))
        .extract(&write_pdf(&dir, "report.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Http(_)));
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let (addr, seen) = spawn_server().await;
    let err = client(addr, Duration::from_secs(2))
        .extract(std::path::Path::new("/nonexistent/missing.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
    assert!(seen.lock().unwrap().is_empty());
}
