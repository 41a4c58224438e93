//! Global per-pixel tone transform.
//!
//! Applied in this order to R, G and B of every pixel:
//!
//! 1. **Contrast + brightness**: `f * (c - 128) + 128 + offset`, with the
//!    classic `259 (C + 255) / (255 (259 - C))` factor pivoting on mid-grey.
//!    Contrast is capped at 98 so the factor's denominator stays positive.
//! 2. **Saturation**: scale each channel's distance from the pixel's luma
//!    (`0.2989 R + 0.587 G + 0.114 B`).
//! 3. **Warmth**: add `1.3 * warmth` to red, subtract it from blue.
//! 4. **Fade**: blend toward white by `max(0, fade) / 100`.
//!
//! Alpha is carried through. Every channel is rounded and clamped to
//! `0..=255` only at the end, so intermediate values may leave that range.

use enough::{Stop, StopReason, Unstoppable};

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::raster::{clamp_channel, fill_rows, Dispatch};
use crate::settings::Settings;

const MID_GREY: f64 = 128.0;
const MAX_CONTRAST: f64 = 98.0;
const LUMA_R: f64 = 0.2989;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;
const WARMTH_SCALE: f64 = 1.3;

/// Tone transform with its coefficients resolved from [`Settings`].
///
/// # Example
///
/// ```
/// use photo_tone::{Settings, ToneMapper};
///
/// let mapper = ToneMapper::new(&Settings::neutral().warmth(10.0));
/// assert_eq!(mapper.map_pixel([100, 150, 200, 255]), [113, 150, 187, 255]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapper {
    brightness_offset: f64,
    contrast_factor: f64,
    saturation_scale: f64,
    warmth_shift: f64,
    fade_factor: f64,
}

impl ToneMapper {
    pub fn new(settings: &Settings) -> Self {
        let contrast = settings.contrast.min(MAX_CONTRAST);
        Self {
            brightness_offset: settings.brightness / 100.0 * 255.0,
            contrast_factor: (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast)),
            saturation_scale: 1.0 + settings.saturation / 100.0,
            warmth_shift: settings.warmth * WARMTH_SCALE,
            fade_factor: settings.fade.max(0.0) / 100.0,
        }
    }

    /// The contrast multiplier; exactly 1 when contrast is 0.
    #[inline]
    pub fn contrast_factor(&self) -> f64 {
        self.contrast_factor
    }

    /// Transform one RGBA pixel.
    #[inline]
    pub fn map_pixel(&self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        let [r, g, b] = [r, g, b].map(|c| {
            self.contrast_factor * (f64::from(c) - MID_GREY) + MID_GREY + self.brightness_offset
        });

        let gray = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        let [r, g, b] = [r, g, b].map(|c| gray + (c - gray) * self.saturation_scale);

        let r = r + self.warmth_shift;
        let b = b - self.warmth_shift;

        let [r, g, b] = [r, g, b].map(|c| c + (255.0 - c) * self.fade_factor);

        [
            clamp_channel(r),
            clamp_channel(g),
            clamp_channel(b),
            clamp_channel(f64::from(a)),
        ]
    }

    fn map_row(&self, src: &[u8], dst: &mut [u8]) {
        for (s, d) in src
            .chunks_exact(CHANNELS)
            .zip(dst.chunks_exact_mut(CHANNELS))
        {
            d.copy_from_slice(&self.map_pixel([s[0], s[1], s[2], s[3]]));
        }
    }
}

/// Apply brightness, contrast, saturation, warmth and fade to every pixel.
///
/// Returns a new buffer with the same dimensions; `buffer` is not modified.
///
/// ```
/// use photo_tone::{map_tone, PixelBuffer, Settings};
///
/// let image = PixelBuffer::filled(2, 2, [100, 150, 200, 255]).unwrap();
/// let out = map_tone(&image, &Settings::neutral());
/// assert_eq!(out, image);
/// ```
pub fn map_tone(buffer: &PixelBuffer, settings: &Settings) -> PixelBuffer {
    match map_tone_with_stop(buffer, settings, &Unstoppable) {
        Ok(out) => out,
        Err(_) => unreachable!("Unstoppable never requests a stop"),
    }
}

/// [`map_tone`] that polls `stop` once per row.
///
/// # Errors
///
/// Returns the [`StopReason`] reported by `stop`; no partial image escapes.
pub fn map_tone_with_stop(
    buffer: &PixelBuffer,
    settings: &Settings,
    stop: &(dyn Stop + Sync),
) -> Result<PixelBuffer, StopReason> {
    map_tone_dispatch(buffer, settings, Dispatch::for_buffer(buffer), stop)
}

pub(crate) fn map_tone_dispatch(
    buffer: &PixelBuffer,
    settings: &Settings,
    dispatch: Dispatch,
    stop: &(dyn Stop + Sync),
) -> Result<PixelBuffer, StopReason> {
    let mapper = ToneMapper::new(settings);
    let stride = buffer.stride();
    let src = buffer.as_bytes();
    let mut out = buffer.zeroed_like();

    fill_rows(&mut out, dispatch, stop, |y, row| {
        mapper.map_row(&src[y * stride..(y + 1) * stride], row);
    })?;

    Ok(out)
}
