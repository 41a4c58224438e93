//! Decode uploads into RGBA8 buffers and encode results as PNG.
//!
//! Decoding accepts the common photo formats, validates the content
//! (not the file name) and downscales so the longest side fits the
//! configured maximum. Encoding always produces PNG so the download is
//! lossless regardless of what was uploaded.

use image::{imageops::FilterType, ImageFormat};
use photo_tone::PixelBuffer;
use std::io::Cursor;
use std::path::Path;

use crate::error::CodecError;

/// Name used when the upload carries no usable file name.
pub const DEFAULT_BASE_NAME: &str = "photo";

/// Extension of every download.
pub const OUTPUT_EXTENSION: &str = "png";

const ACCEPTED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// A decoded, possibly downscaled, upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// RGBA8 pixels at working resolution
    pub buffer: PixelBuffer,
    /// Detected container format
    pub format: ImageFormat,
    /// Dimensions before downscaling
    pub original_width: u32,
    pub original_height: u32,
}

impl DecodedImage {
    /// Whether the image was downscaled during decoding.
    pub fn was_resized(&self) -> bool {
        self.buffer.width() != self.original_width || self.buffer.height() != self.original_height
    }
}

/// Dimensions after fitting the longest side into `max_dimension`.
///
/// Uses `scale = min(1, max_dimension / longest_side)`; images already
/// within bounds keep their size. Each side is rounded and at least 1.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 || longest <= max_dimension {
        return (width, height);
    }
    let scale = (f64::from(max_dimension) / f64::from(longest)).min(1.0);
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode image bytes into an RGBA8 buffer no larger than `max_dimension`.
///
/// # Errors
///
/// - [`CodecError::UnsupportedFormat`] if the bytes are not one of the
///   accepted formats
/// - [`CodecError::Decode`] if the data is corrupt or truncated
/// - [`CodecError::PixelSurface`] if the decoded image has no pixels
pub fn decode_image(bytes: &[u8], max_dimension: u32) -> Result<DecodedImage, CodecError> {
    let format = image::guess_format(bytes).map_err(|_| CodecError::UnsupportedFormat)?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(CodecError::UnsupportedFormat);
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (original_width, original_height) = rgba.dimensions();

    let (width, height) = fit_within(original_width, original_height, max_dimension);
    let rgba = if (width, height) != (original_width, original_height) {
        tracing::debug!(
            from_width = original_width,
            from_height = original_height,
            to_width = width,
            to_height = height,
            "Downscaling upload"
        );
        image::imageops::resize(&rgba, width, height, FilterType::Lanczos3)
    } else {
        rgba
    };

    let buffer = PixelBuffer::new(width, height, rgba.into_raw())?;

    Ok(DecodedImage {
        buffer,
        format,
        original_width,
        original_height,
    })
}

/// Encode an RGBA8 buffer as PNG.
///
/// With `optimize`, the result is re-compressed by oxipng; if that fails
/// the plain encoding is returned.
pub fn encode_png(buffer: &PixelBuffer, optimize: bool) -> Result<Vec<u8>, CodecError> {
    let compression = if optimize {
        // oxipng will re-compress optimally
        png::Compression::Fast
    } else {
        png::Compression::Default
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, buffer.width(), buffer.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(buffer.as_bytes())
            .map_err(|e| CodecError::PngEncode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    if !optimize {
        return Ok(png_bytes);
    }

    match oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    ) {
        Ok(optimized) => Ok(optimized),
        Err(e) => {
            tracing::debug!(%e, "oxipng failed, keeping plain encoding");
            Ok(png_bytes)
        }
    }
}

/// Download name for an enhanced image.
///
/// Takes the stem of `input_name` (directories and extension dropped),
/// appends `suffix` and forces the `.png` extension. Characters that would
/// break a `Content-Disposition` header are replaced by `_`.
pub fn output_filename(input_name: Option<&str>, suffix: &str) -> String {
    let stem = input_name
        .map(|name| name.replace('\\', "/"))
        .and_then(|name| {
            Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .map(|s| sanitize(&s))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());

    format!("{stem}{}.{OUTPUT_EXTENSION}", sanitize(suffix))
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '/' | '\\' | ';') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
