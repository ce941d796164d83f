use crate::config::Config;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::PlateError;
use crate::reader::PlateReader;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Multipart field carrying the photo
const IMAGE_FIELD: &str = "image";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<PlateReader>,
    pub config: Arc<Config>,
    pub engines: Arc<Vec<EngineInfo>>,
}

impl AppState {
    /// Select the configured engine from `registry` and build the reader around it
    pub fn new(config: Config, registry: &EngineRegistry) -> Result<Self, PlateError> {
        let recognizer = registry.select(config.engine.as_deref(), config.serialize_ocr)?;
        let reader = PlateReader::new(&config.pipeline, recognizer);

        Ok(Self {
            reader: Arc::new(reader),
            config: Arc::new(config),
            engines: Arc::new(registry.info()),
        })
    }
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    /// Plate token, or the sentinel phrase when nothing was read
    pub number: String,
    pub outcome: &'static str,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub available_engines: Vec<EngineInfo>,
    pub frame_width: u32,
    pub frame_height: u32,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&config)?;
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, &registry)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Routes, body limit, CORS and request tracing
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/upload", post(handle_upload))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        // Leave room for the multipart framing around the file itself
        .layer(DefaultBodyLimit::max(max_file_size + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle plate reading requests
async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, PlateError> {
    let start = Instant::now();
    let max = state.config.max_file_size;
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    let mut file_data: Option<Bytes> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", declared, max))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file data", declared, max))?,
            );
        }
    }

    let data = file_data
        .filter(|data| !data.is_empty())
        .ok_or(PlateError::MissingFile)?;

    if data.len() > max {
        return Err(PlateError::ImageTooLarge {
            size: data.len(),
            max,
        });
    }

    let reader = state.reader.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let image =
            image::load_from_memory(&data).map_err(|e| PlateError::InvalidImage(e.to_string()))?;
        tracing::debug!("Decoded {}x{} upload", image.width(), image.height());
        reader.read(&image)
    })
    .await
    .map_err(|e| PlateError::Internal(format!("Plate reading task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Plate read in {}ms: {} ({})",
        processing_time_ms,
        outcome.message(),
        outcome.kind()
    );

    Ok(Json(UploadResponse {
        number: outcome.message().to_string(),
        outcome: outcome.kind(),
        processing_time_ms,
    }))
}

/// Body limit rejections surface as 413, everything else as a bad request
fn multipart_error(
    err: MultipartError,
    context: &str,
    declared: Option<usize>,
    max: usize,
) -> PlateError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PlateError::ImageTooLarge {
            size: declared.unwrap_or(max + 1),
            max,
        }
    } else {
        PlateError::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let (frame_width, frame_height) = state.reader.frame();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.reader.engine_name().to_string(),
        available_engines: state.engines.as_ref().clone(),
        frame_width,
        frame_height,
        max_file_size_bytes: state.config.max_file_size,
    })
}
