use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use photo_tone::{Adjustment, Preset, Settings};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::services::{clamp_user_settings, EnhanceRequest, EnhanceService};

/// Header naming the client session whose older jobs may be cancelled.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Query parameters for `POST /api/enhance`.
///
/// Unset sliders come from the preset; without a preset the server's
/// configured defaults apply.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnhanceQuery {
    /// Starting point: "default", "auto" (alias "auto-enhance") or "neutral" (alias "none")
    pub preset: Option<String>,
    /// Brightness offset, suggested range -40..60
    pub brightness: Option<f64>,
    /// Contrast amount, suggested range -30..60
    pub contrast: Option<f64>,
    /// Saturation amount, suggested range -20..50
    pub saturation: Option<f64>,
    /// Warm/cool shift, suggested range -15..25
    pub warmth: Option<f64>,
    /// Local contrast, suggested range 0..60
    pub clarity: Option<f64>,
    /// Lift towards white, suggested range 0..40
    pub fade: Option<f64>,
    /// Original file name, used for the download name
    pub filename: Option<String>,
}

impl EnhanceQuery {
    fn overrides(&self) -> impl Iterator<Item = (Adjustment, f64)> {
        [
            (Adjustment::Brightness, self.brightness),
            (Adjustment::Contrast, self.contrast),
            (Adjustment::Saturation, self.saturation),
            (Adjustment::Warmth, self.warmth),
            (Adjustment::Clarity, self.clarity),
            (Adjustment::Fade, self.fade),
        ]
        .into_iter()
        .filter_map(|(adjustment, value)| value.map(|v| (adjustment, v)))
    }

    /// Resolve the effective settings, before range clamping.
    ///
    /// The "default" preset means the configured `defaults`.
    pub fn resolve_settings(&self, defaults: &Settings) -> Result<Settings, ApiError> {
        let base = match self.preset.as_deref() {
            None => *defaults,
            Some(name) => match name.parse::<Preset>() {
                Ok(Preset::Default) => *defaults,
                Ok(preset) => preset.settings(),
                Err(e) => return Err(ApiError::BadRequest(e.to_string())),
            },
        };

        Ok(self
            .overrides()
            .fold(base, |settings, (adjustment, value)| {
                settings.with(adjustment, value)
            }))
    }
}

/// `Content-Disposition` value with an ASCII fallback and an RFC 5987 name.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

/// Enhance an uploaded photo
///
/// The request body is the raw image (PNG, JPEG, GIF, BMP or WebP). The
/// response is the enhanced image as a lossless PNG download.
#[utoipa::path(
    post,
    path = "/api/enhance",
    request_body(
        content = Vec<u8>,
        content_type = "application/octet-stream",
        description = "Raw image bytes"
    ),
    responses(
        (status = 200, description = "Enhanced PNG image", content_type = "image/png"),
        (status = 400, description = "Empty body, corrupt image or invalid parameters"),
        (status = 409, description = "Superseded by a newer request for the same session"),
        (status = 413, description = "Upload larger than the configured limit"),
        (status = 415, description = "Unsupported image format"),
    ),
    params(
        EnhanceQuery,
        ("X-Session-Id" = Option<String>, Header, description = "Client session; a newer request cancels older ones"),
    ),
    tag = "Enhance"
)]
pub async fn handle_enhance(
    State(service): State<Arc<EnhanceService>>,
    query: Result<Query<EnhanceQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let max_upload = service.config().max_upload_bytes;

    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let body = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge {
                size: content_length(&headers).unwrap_or(0),
                max: max_upload,
            }
        } else {
            ApiError::BadRequest(e.body_text())
        }
    })?;

    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    if body.len() > max_upload {
        return Err(ApiError::PayloadTooLarge {
            size: body.len(),
            max: max_upload,
        });
    }

    let settings = clamp_user_settings(query.resolve_settings(&service.config().defaults)?);
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let upload_bytes = body.len();
    let result = service
        .enhance(
            EnhanceRequest {
                bytes: body.to_vec(),
                settings,
                filename: query.filename,
            },
            session,
        )
        .await?;

    let etag = format!("\"{}\"", hex::encode(Sha256::digest(&result.png_bytes)));

    tracing::info!(
        filename = %result.filename,
        width = result.width,
        height = result.height,
        upload_bytes,
        size_bytes = result.png_bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Image enhanced"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_LENGTH, result.png_bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&result.filename),
            ),
            (header::ETAG, etag),
            (
                header::HeaderName::from_static("x-image-width"),
                result.width.to_string(),
            ),
            (
                header::HeaderName::from_static("x-image-height"),
                result.height.to_string(),
            ),
        ],
        Bytes::from(result.png_bytes),
    )
        .into_response())
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_preset_uses_defaults() {
        let defaults = Settings::default().clarity(0.0);
        let settings = EnhanceQuery::default().resolve_settings(&defaults).unwrap();
        assert_eq!(settings, defaults);
    }

    #[test]
    fn test_resolve_named_preset_with_override() {
        let query = EnhanceQuery {
            preset: Some("auto".to_string()),
            warmth: Some(-5.0),
            ..Default::default()
        };
        let settings = query.resolve_settings(&Settings::default()).unwrap();
        assert_eq!(settings, Settings::auto_enhance().warmth(-5.0));
    }

    #[test]
    fn test_resolve_default_preset_means_configured_defaults() {
        let defaults = Settings::neutral().fade(20.0);
        let query = EnhanceQuery {
            preset: Some("default".to_string()),
            ..Default::default()
        };
        assert_eq!(query.resolve_settings(&defaults).unwrap(), defaults);
    }

    #[test]
    fn test_resolve_unknown_preset() {
        let query = EnhanceQuery {
            preset: Some("vivid".to_string()),
            ..Default::default()
        };
        let err = query.resolve_settings(&Settings::default()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("vivid")));
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("cat-enhanced.png"),
            "attachment; filename=\"cat-enhanced.png\"; filename*=UTF-8''cat%2Denhanced%2Epng"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let value = content_disposition("café-enhanced.png");
        assert!(value.starts_with("attachment; filename=\"caf_-enhanced.png\""));
        assert!(value.contains("caf%C3%A9"));
    }
}
