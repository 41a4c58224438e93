use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photo_tone::BufferError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body is empty; expected image bytes")]
    EmptyBody,

    #[error("Upload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Image error: {0}")]
    Codec(#[from] CodecError),

    #[error("Superseded by a newer request for this session")]
    Superseded,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported file type; expected PNG, JPEG, GIF, BMP or WebP")]
    UnsupportedFormat,

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not allocate pixel surface: {0}")]
    PixelSurface(#[from] BufferError),

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::EmptyBody => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Codec(CodecError::UnsupportedFormat) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Codec(CodecError::Decode(_)) => StatusCode::BAD_REQUEST,
            ApiError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Superseded => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}
