//! photo-tone: slider-driven photo enhancement for RGBA8 images
//!
//! This crate holds the pixel math behind photoglow: a global tone
//! transform followed by an optional clarity (sharpening) convolution. It
//! performs no I/O; decoding and encoding belong to the caller.
//!
//! # Quick Start
//!
//! ```
//! use photo_tone::{enhance, PixelBuffer, Settings};
//!
//! let photo = PixelBuffer::filled(2, 2, [100, 150, 200, 255]).unwrap();
//!
//! // Neutral settings leave the image untouched
//! assert_eq!(enhance(&photo, &Settings::neutral()), photo);
//!
//! // Warmth shifts red up and blue down by 1.3 per step
//! let warm = enhance(&photo, &Settings::neutral().warmth(10.0));
//! assert_eq!(warm.pixel(0, 0), [113, 150, 187, 255]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PixelBuffer (RGBA8)
//!     |
//!     v
//! map_tone          contrast + brightness -> saturation -> warmth -> fade
//!     |
//!     v
//! clarity > 0 ? --no--> result
//!     |
//!    yes
//!     v
//! sharpen           3x3 Laplacian-boost kernel, clamp-to-edge borders
//!     |
//!     v
//! result
//! ```
//!
//! Each stage reads an immutable input and allocates its output, so the
//! caller's buffer is never modified.
//!
//! # Parallelism and Cancellation
//!
//! Large images are processed row-parallel on the rayon pool. Output does
//! not depend on the schedule: each output row is computed from the input
//! alone.
//!
//! The `*_with_stop` variants poll an [`enough::Stop`] implementation once
//! per row. [`CancelToken`] is a cloneable flag suited to abandoning work
//! when newer settings arrive.
//!
//! ```
//! use photo_tone::{enhance_with_stop, CancelToken, PixelBuffer, Settings};
//!
//! let token = CancelToken::new();
//! token.cancel();
//!
//! let photo = PixelBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap();
//! assert!(enhance_with_stop(&photo, &Settings::default(), &token).is_err());
//! ```

pub mod buffer;
pub mod cancel;
pub mod pipeline;
mod raster;
pub mod settings;
pub mod sharpen;
pub mod tone;


pub use buffer::{BufferError, PixelBuffer, CHANNELS};
pub use cancel::CancelToken;
pub use enough::{Stop, StopReason, Unstoppable};
pub use pipeline::{enhance, enhance_with_stop};
pub use raster::PARALLEL_THRESHOLD;
pub use settings::{Adjustment, Preset, Settings, UnknownName};
pub use sharpen::{sharpen, sharpen_with_stop, ClarityKernel, CLARITY_STRENGTH};
pub use tone::{map_tone, map_tone_with_stop, ToneMapper};
