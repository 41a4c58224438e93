//! Owned RGBA8 pixel storage.
//!
//! [`PixelBuffer`] is the unit of exchange between the decoder, the two
//! processing stages and the encoder. It owns its samples; every stage reads
//! one buffer and returns a freshly allocated one.

use thiserror::Error;

/// Bytes per pixel (interleaved R, G, B, A).
pub const CHANNELS: usize = 4;

/// Error returned when a [`PixelBuffer`] cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Width or height is zero.
    #[error("image has no pixels ({width}x{height})")]
    Empty {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Sample count does not match `width * height * 4`.
    #[error("pixel data length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Byte length implied by the dimensions
        expected: usize,
        /// Byte length supplied
        actual: usize,
    },

    /// `width * height * 4` does not fit in memory addressing.
    #[error("image dimensions too large: {width}x{height}")]
    TooLarge {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// An RGBA8 image in row-major, interleaved order.
///
/// The invariant `data.len() == width * height * 4` (with non-zero
/// dimensions) is checked on construction and holds for the lifetime of
/// the value, so processing code can index without further validation.
///
/// # Example
///
/// ```
/// use photo_tone::PixelBuffer;
///
/// let buffer = PixelBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
/// assert_eq!(buffer.width(), 2);
/// assert_eq!(buffer.pixel(1, 0), [0, 0, 255, 255]);
///
/// assert!(PixelBuffer::new(2, 2, vec![0; 4]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap existing RGBA8 samples.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if either dimension is zero or `data` does
    /// not hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BufferError> {
        let len = byte_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate a zeroed buffer with the same dimensions as `self`.
    pub(crate) fn zeroed_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in one row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Raw RGBA samples.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its samples.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::Empty { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(BufferError::TooLarge { width, height })
}
