//! Two-stage enhancement: tone mapping, then clarity when enabled.

use enough::{Stop, StopReason, Unstoppable};

use crate::buffer::PixelBuffer;
use crate::settings::Settings;
use crate::sharpen::sharpen_with_stop;
use crate::tone::map_tone_with_stop;

/// Run the full pipeline on `buffer`.
///
/// The clarity stage only runs for `settings.clarity > 0`, with the slider
/// percentage converted to a fraction.
///
/// ```
/// use photo_tone::{enhance, PixelBuffer, Settings};
///
/// let photo = PixelBuffer::filled(4, 3, [100, 150, 200, 255]).unwrap();
/// let out = enhance(&photo, &Settings::auto_enhance());
/// assert_eq!((out.width(), out.height()), (4, 3));
/// ```
pub fn enhance(buffer: &PixelBuffer, settings: &Settings) -> PixelBuffer {
    match enhance_with_stop(buffer, settings, &Unstoppable) {
        Ok(out) => out,
        Err(_) => unreachable!("Unstoppable never requests a stop"),
    }
}

/// [`enhance`] with cooperative cancellation.
///
/// # Errors
///
/// Returns the [`StopReason`] from `stop` if it fires during either stage.
pub fn enhance_with_stop(
    buffer: &PixelBuffer,
    settings: &Settings,
    stop: &(dyn Stop + Sync),
) -> Result<PixelBuffer, StopReason> {
    let toned = map_tone_with_stop(buffer, settings, stop)?;
    if settings.clarity > 0.0 {
        sharpen_with_stop(&toned, settings.clarity / 100.0, stop)
    } else {
        Ok(toned)
    }
}
