use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlateError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Text recognition failed: {0}")]
    RecognitionError(String),

    #[error("Unknown OCR engine: {0}")]
    UnknownEngine(String),

    #[error("Could not decode image: {0}")]
    InvalidImage(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlateError {
    /// Machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            PlateError::InitializationError(_) => "INIT_ERROR",
            PlateError::RecognitionError(_) => "RECOGNITION_ERROR",
            PlateError::UnknownEngine(_) => "UNKNOWN_ENGINE",
            PlateError::InvalidImage(_) => "INVALID_IMAGE",
            PlateError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            PlateError::MissingFile => "MISSING_FILE",
            PlateError::InvalidRequest(_) => "INVALID_REQUEST",
            PlateError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PlateError::InitializationError(_)
            | PlateError::RecognitionError(_)
            | PlateError::UnknownEngine(_)
            | PlateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlateError::InvalidImage(_)
            | PlateError::MissingFile
            | PlateError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PlateError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for PlateError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}
