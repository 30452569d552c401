use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0} bytes, max allowed: {1} bytes")]
    FileTooLarge(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AgriError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AgriError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AgriError::UnknownCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AgriError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AgriError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AgriError::Base64(_) => StatusCode::BAD_REQUEST,
            AgriError::Json(_) => StatusCode::BAD_REQUEST,
            AgriError::ImageDecode(_) => StatusCode::BAD_REQUEST,
            AgriError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AgriError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            AgriError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            AgriError::Inference(_) => "INFERENCE_ERROR",
            AgriError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            AgriError::Schema(_) => "SCHEMA_MISMATCH",
            AgriError::InvalidInput(_) => "INVALID_INPUT",
            AgriError::FileTooLarge(_, _) => "FILE_TOO_LARGE",
            AgriError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AgriError::Config(_) => "CONFIG_ERROR",
            AgriError::Io(_) => "IO_ERROR",
            AgriError::Json(_) => "JSON_ERROR",
            AgriError::Csv(_) => "DATASET_ERROR",
            AgriError::Base64(_) => "BASE64_DECODE_ERROR",
            AgriError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            AgriError::Ort(_) => "ORT_ERROR",
            AgriError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AgriError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });

        if status.is_server_error() {
            tracing::error!("Request failed: {} ({})", self, status);
        } else {
            tracing::warn!("Request rejected: {} ({})", self, status);
        }

        (status, axum::Json(error_response)).into_response()
    }
}
