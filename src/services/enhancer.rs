use photo_tone::{enhance_with_stop, Adjustment, Settings, Stop, Unstoppable};
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::codec::{decode_image, encode_png, output_filename};
use crate::services::SessionJobs;

/// One enhancement request: image bytes plus slider values.
#[derive(Debug, Clone)]
pub struct EnhanceRequest {
    /// Encoded image as uploaded
    pub bytes: Vec<u8>,
    /// Slider values (already clamped by the caller if desired)
    pub settings: Settings,
    /// Original file name, used for the download name
    pub filename: Option<String>,
}

/// Result of a successful enhancement.
#[derive(Debug, Clone)]
pub struct EnhancedImage {
    /// PNG-encoded result
    pub png_bytes: Vec<u8>,
    /// Suggested download name
    pub filename: String,
    /// Output dimensions
    pub width: u32,
    pub height: u32,
    /// Upload dimensions before downscaling
    pub original_width: u32,
    pub original_height: u32,
}

/// Clamp user-supplied settings to slider ranges, logging what changed.
pub fn clamp_user_settings(settings: Settings) -> Settings {
    let offenders = settings.out_of_range();
    if offenders.is_empty() {
        return settings;
    }

    let clamped = settings.clamped_to_ranges();
    for adjustment in offenders {
        let range = adjustment.range();
        tracing::warn!(
            adjustment = %adjustment,
            requested = settings.get(adjustment),
            applied = clamped.get(adjustment),
            min = *range.start(),
            max = *range.end(),
            "Setting outside slider range, clamped"
        );
    }
    clamped
}

/// Decode, enhance and encode one image.
///
/// `stop` is checked between stages and per row inside the pipeline; a
/// cancelled job returns [`ApiError::Superseded`] and no image.
pub fn process(
    config: &AppConfig,
    request: &EnhanceRequest,
    stop: &(dyn Stop + Sync),
) -> Result<EnhancedImage, ApiError> {
    let started = Instant::now();

    let decoded = decode_image(&request.bytes, config.max_dimension)?;
    let decoded_at = Instant::now();
    stop.check().map_err(|_| ApiError::Superseded)?;

    let enhanced = enhance_with_stop(&decoded.buffer, &request.settings, stop)
        .map_err(|_| ApiError::Superseded)?;
    let enhanced_at = Instant::now();
    stop.check().map_err(|_| ApiError::Superseded)?;

    let png_bytes = encode_png(&enhanced, config.optimize_png)?;

    tracing::debug!(
        format = ?decoded.format,
        width = enhanced.width(),
        height = enhanced.height(),
        clarity = request.settings.get(Adjustment::Clarity),
        decode_ms = (decoded_at - started).as_millis() as u64,
        enhance_ms = (enhanced_at - decoded_at).as_millis() as u64,
        encode_ms = enhanced_at.elapsed().as_millis() as u64,
        "Enhancement stages complete"
    );

    Ok(EnhancedImage {
        png_bytes,
        filename: output_filename(request.filename.as_deref(), &config.output_suffix),
        width: enhanced.width(),
        height: enhanced.height(),
        original_width: decoded.original_width,
        original_height: decoded.original_height,
    })
}

/// Enhancement service shared by HTTP handlers.
pub struct EnhanceService {
    config: Arc<AppConfig>,
    jobs: SessionJobs,
}

impl EnhanceService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            jobs: SessionJobs::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jobs(&self) -> &SessionJobs {
        &self.jobs
    }

    /// Enhance an image off the async runtime.
    ///
    /// With a `session`, any earlier job of the same session still in
    /// flight is cancelled and answers [`ApiError::Superseded`].
    pub async fn enhance(
        &self,
        request: EnhanceRequest,
        session: Option<&str>,
    ) -> Result<EnhancedImage, ApiError> {
        // Dropping the guard (also when this future is dropped) cancels the
        // job and releases the session
        let guard = match session {
            Some(session) => Some(self.jobs.begin(session).await),
            None => None,
        };

        let config = self.config.clone();
        let token = guard.as_ref().map(|g| g.token().clone());

        // Pixel work is CPU-bound; keep it off the async workers
        let result = tokio::task::spawn_blocking(move || match token {
            Some(token) => process(&config, &request, &token),
            None => process(&config, &request, &Unstoppable),
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Task error: {e}")));

        drop(guard);
        result?
    }
}
