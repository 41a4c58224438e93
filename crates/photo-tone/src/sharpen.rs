//! Clarity: 3×3 unsharp-style convolution.
//!
//! The kernel is a discrete Laplacian added to the identity:
//!
//! ```text
//!   0   -a    0
//!  -a  1+4a  -a
//!   0   -a    0
//! ```
//!
//! with `a = max(0, clarity) * 0.55`. Weights sum to 1, so flat regions are
//! untouched and edges gain local contrast. Neighbours outside the image
//! are replaced by the nearest edge pixel (clamp-to-edge).
//!
//! All four channels go through the kernel, alpha included. On images with
//! a varying alpha channel this sharpens the alpha edges as well.

use enough::{Stop, StopReason, Unstoppable};

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::raster::{clamp_channel, fill_rows, Dispatch};

/// Scale from the clarity fraction to the Laplacian weight.
pub const CLARITY_STRENGTH: f64 = 0.55;

/// Row-major 3×3 convolution weights.
///
/// ```
/// use photo_tone::ClarityKernel;
///
/// let kernel = ClarityKernel::from_clarity(1.0);
/// let w = kernel.weights();
/// assert!((w[4] - 3.2).abs() < 1e-12);
/// assert!((w[1] + 0.55).abs() < 1e-12);
/// assert_eq!(w[0], 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarityKernel {
    weights: [f64; 9],
}

impl ClarityKernel {
    /// Build the kernel for a clarity fraction (slider value / 100).
    ///
    /// Negative amounts behave like 0.
    pub fn from_clarity(clarity_amount: f64) -> Self {
        let amount = clarity_amount.max(0.0) * CLARITY_STRENGTH;
        let edge = -amount;
        let center = 1.0 + 4.0 * amount;
        Self {
            #[rustfmt::skip]
            weights: [
                0.0,  edge,   0.0,
                edge, center, edge,
                0.0,  edge,   0.0,
            ],
        }
    }

    /// The nine weights, row-major.
    #[inline]
    pub fn weights(&self) -> &[f64; 9] {
        &self.weights
    }

    /// Weight for neighbour offset `(dx, dy)`, each in `-1..=1`.
    #[inline]
    pub fn weight(&self, dx: i32, dy: i32) -> f64 {
        self.weights[((dy + 1) * 3 + (dx + 1)) as usize]
    }

    fn convolve_row(&self, src: &PixelBuffer, y: usize, dst: &mut [u8]) {
        let width = src.width() as usize;
        let height = src.height() as usize;
        let stride = src.stride();
        let data = src.as_bytes();

        let rows = [y.saturating_sub(1), y, (y + 1).min(height - 1)];

        for x in 0..width {
            let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];
            for c in 0..CHANNELS {
                let mut sum = 0.0;
                for (ky, &sy) in rows.iter().enumerate() {
                    let base = sy * stride;
                    for (kx, &sx) in cols.iter().enumerate() {
                        sum += f64::from(data[base + sx * CHANNELS + c]) * self.weights[ky * 3 + kx];
                    }
                }
                dst[x * CHANNELS + c] = clamp_channel(sum);
            }
        }
    }
}

/// Sharpen `buffer` with the clarity kernel.
///
/// `clarity_amount` is a fraction (slider value divided by 100). An amount
/// of 0 returns a copy of the input.
///
/// ```
/// use photo_tone::{sharpen, PixelBuffer};
///
/// let flat = PixelBuffer::filled(3, 3, [90, 90, 90, 255]).unwrap();
/// assert_eq!(sharpen(&flat, 0.6), flat);
/// ```
pub fn sharpen(buffer: &PixelBuffer, clarity_amount: f64) -> PixelBuffer {
    match sharpen_with_stop(buffer, clarity_amount, &Unstoppable) {
        Ok(out) => out,
        Err(_) => unreachable!("Unstoppable never requests a stop"),
    }
}

/// [`sharpen`] that polls `stop` once per row.
///
/// # Errors
///
/// Returns the [`StopReason`] reported by `stop`.
pub fn sharpen_with_stop(
    buffer: &PixelBuffer,
    clarity_amount: f64,
    stop: &(dyn Stop + Sync),
) -> Result<PixelBuffer, StopReason> {
    sharpen_dispatch(buffer, clarity_amount, Dispatch::for_buffer(buffer), stop)
}

pub(crate) fn sharpen_dispatch(
    buffer: &PixelBuffer,
    clarity_amount: f64,
    dispatch: Dispatch,
    stop: &(dyn Stop + Sync),
) -> Result<PixelBuffer, StopReason> {
    let kernel = ClarityKernel::from_clarity(clarity_amount);
    let mut out = buffer.zeroed_like();

    fill_rows(&mut out, dispatch, stop, |y, row| {
        kernel.convolve_row(buffer, y, row);
    })?;

    Ok(out)
}
