use axum::{extract::State, response::Json};
use photo_tone::{Adjustment, Settings};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::services::EnhanceService;

/// Slider values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SettingsBody {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub warmth: f64,
    pub clarity: f64,
    pub fade: f64,
}

impl From<Settings> for SettingsBody {
    fn from(s: Settings) -> Self {
        Self {
            brightness: s.brightness,
            contrast: s.contrast,
            saturation: s.saturation,
            warmth: s.warmth,
            clarity: s.clarity,
            fade: s.fade,
        }
    }
}

/// Suggested slider range for one adjustment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RangeBody {
    pub name: String,
    pub min: f64,
    pub max: f64,
    /// Built-in default, independent of server configuration
    pub default: f64,
}

/// Response from the /api/presets endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresetsResponse {
    /// Settings used when a request names no preset
    pub defaults: SettingsBody,
    /// One-click "auto enhance" settings
    pub auto: SettingsBody,
    /// Settings that leave the image unchanged
    pub neutral: SettingsBody,
    /// Slider ranges in display order
    pub ranges: Vec<RangeBody>,
}

impl PresetsResponse {
    pub fn new(defaults: Settings) -> Self {
        Self {
            defaults: defaults.into(),
            auto: Settings::auto_enhance().into(),
            neutral: Settings::neutral().into(),
            ranges: Adjustment::ALL
                .iter()
                .map(|&adjustment| RangeBody {
                    name: adjustment.name().to_string(),
                    min: *adjustment.range().start(),
                    max: *adjustment.range().end(),
                    default: adjustment.default_value(),
                })
                .collect(),
        }
    }
}

/// List presets and slider ranges
///
/// Clients use this to build their slider UI.
#[utoipa::path(
    get,
    path = "/api/presets",
    responses(
        (status = 200, description = "Presets and slider ranges", body = PresetsResponse),
    ),
    tag = "Enhance"
)]
pub async fn handle_presets(State(service): State<Arc<EnhanceService>>) -> Json<PresetsResponse> {
    Json(PresetsResponse::new(service.config().defaults))
}
