use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use license_plate_server::config::Config;
use license_plate_server::engines::EngineRegistry;
use license_plate_server::server::{router, AppState};
use license_plate_server::{PlateError, TextRecognizer};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct UploadResponse {
    number: String,
    outcome: String,
    processing_time_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct EngineInfo {
    name: String,
    description: String,
    supported_languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    engine: String,
    available_engines: Vec<EngineInfo>,
    frame_width: u32,
    frame_height: u32,
    max_file_size_bytes: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Stands in for a real OCR model: answers every crop with the same lines
struct ScriptedEngine {
    lines: Vec<String>,
}

impl TextRecognizer for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn description(&self) -> &'static str {
        "Scripted engine for tests"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<String>, PlateError> {
        Ok(self.lines.clone())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["eng".to_string()]
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(lines: &[&str], max_file_size: usize) -> Self {
        let engine: Arc<dyn TextRecognizer> = Arc::new(ScriptedEngine {
            lines: lines.iter().map(|s| s.to_string()).collect(),
        });
        let registry = EngineRegistry::from_engines(vec![engine]).unwrap();

        let mut config = Config::local(0);
        config.max_file_size = max_file_size;
        let state = AppState::new(config, &registry).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn blank_photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 600, Rgb([255, 255, 255])))
}

/// White card with a thick black border, as a plate would appear head-on
fn plate_photo() -> DynamicImage {
    let white = Rgb([255, 255, 255]);
    let mut img = RgbImage::from_pixel(800, 600, Rgb([200, 200, 200]));
    draw_filled_rect_mut(&mut img, Rect::at(200, 250).of_size(400, 100), Rgb([0, 0, 0]));
    draw_filled_rect_mut(&mut img, Rect::at(210, 260).of_size(380, 80), white);
    DynamicImage::ImageRgb8(img)
}

async fn upload(base_url: &str, field: &str, bytes: Vec<u8>) -> reqwest::Response {
    let part = Part::bytes(bytes)
        .file_name("car.png")
        .mime_str("image/png")
        .unwrap();

    reqwest::Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(Form::new().part(field.to_string(), part))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start(&[], 1 << 20).await;

    let response: HealthResponse = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = TestServer::start(&[], 1 << 20).await;

    let response: InfoResponse = reqwest::get(format!("{}/info", server.base_url))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(!response.version.is_empty());
    assert_eq!(response.engine, "scripted");
    assert_eq!(response.available_engines.len(), 1);
    assert_eq!((response.frame_width, response.frame_height), (400, 600));
    assert_eq!(response.max_file_size_bytes, 1 << 20);
}

#[tokio::test]
async fn test_plate_is_read() {
    let server = TestServer::start(&["ab-123 cd"], 1 << 22).await;

    let response = upload(&server.base_url, "image", png_bytes(&plate_photo())).await;
    assert!(response.status().is_success());

    let body: UploadResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(body.number, "AB123CD");
    assert_eq!(body.outcome, "recognized");
}

#[tokio::test]
async fn test_blank_photo_not_detected() {
    let server = TestServer::start(&["AB123CD"], 1 << 22).await;

    let body: UploadResponse = upload(&server.base_url, "image", png_bytes(&blank_photo()))
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body.number, "License plate not detected.");
    assert_eq!(body.outcome, "not_detected");
}

#[tokio::test]
async fn test_illegible_plate_unrecognized() {
    let server = TestServer::start(&[], 1 << 22).await;

    let body: UploadResponse = upload(&server.base_url, "image", png_bytes(&plate_photo()))
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body.number, "Could not recognize the license plate.");
    assert_eq!(body.outcome, "unrecognized");
}

#[tokio::test]
async fn test_missing_image_is_client_error() {
    let server = TestServer::start(&[], 1 << 22).await;

    let response = upload(&server.base_url, "photo", png_bytes(&blank_photo())).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(body.error, "No file uploaded");
    assert_eq!(body.code, "MISSING_FILE");
}

#[tokio::test]
async fn test_undecodable_image_is_client_error() {
    let server = TestServer::start(&[], 1 << 22).await;

    let response = upload(&server.base_url, "image", b"definitely not a png".to_vec()).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(body.code, "INVALID_IMAGE");
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let server = TestServer::start(&[], 1024).await;

    let response = upload(&server.base_url, "image", vec![0u8; 4096]).await;
    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_beyond_body_limit_rejected() {
    let server = TestServer::start(&[], 1024).await;

    // Well past the multipart allowance on top of the file limit
    let response = upload(&server.base_url, "image", vec![0u8; 200 * 1024]).await;
    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);

    let body: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(body.code, "IMAGE_TOO_LARGE");
}
