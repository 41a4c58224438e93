//! Test fixtures: small in-memory images in every accepted format.

use image::{ImageFormat, Rgba, RgbaImage};
use photo_tone::PixelBuffer;
use std::io::Cursor;

/// Colour of the uniform fixtures
pub const SKY: [u8; 4] = [100, 150, 200, 255];

/// Uniform PNG of the given size
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let buffer = PixelBuffer::filled(width, height, rgba).unwrap();
    photoglow::services::encode_png(&buffer, false).unwrap()
}

/// Horizontal gradient so clarity has edges to work on
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

/// Gradient in another container format
pub fn gradient_as(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let image = gradient(width, height);
    if format == ImageFormat::Jpeg {
        // JPEG has no alpha channel
        let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
        let mut out = Cursor::new(Vec::new());
        rgb.write_to(&mut out, format).unwrap();
        return out.into_inner();
    }
    encode(&image, format)
}

/// A valid PNG cut in half
pub fn truncated_png() -> Vec<u8> {
    let bytes = gradient_png(32, 32);
    bytes[..bytes.len() / 2].to_vec()
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = (x * 255 / width.max(2).saturating_sub(1).max(1)).min(255) as u8;
        Rgba([v, (y * 7 % 256) as u8, 255 - v, 255])
    })
}

fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}
