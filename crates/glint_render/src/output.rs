//! Image sink: serializing a pixel buffer to disk.
//!
//! The native format is binary PPM (P6): a plain-text
//! `width height 255` header followed by one byte per channel. Other
//! extensions are handed to the `image` crate's format dispatch as a
//! convenience.

use std::path::Path;

use glint_math::Vec3;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ImageEncoder};
use thiserror::Error;

/// Errors raised while writing an image.
#[derive(Error, Debug)]
pub enum ImageWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Convert linear [0, 1] colors to packed 8-bit RGB.
///
/// Channels clamp to [0, 1] first; shading already truncates the upper
/// bound, but the shadow heuristic can technically drive a channel
/// below zero and that must not wrap.
fn to_rgb8(pixels: &[Vec3]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for pixel in pixels {
        for channel in [pixel.x, pixel.y, pixel.z] {
            bytes.push((channel.clamp(0.0, 1.0) * 255.0) as u8);
        }
    }
    bytes
}

/// Encode a row-major pixel buffer as binary PPM bytes.
pub fn encode_ppm(pixels: &[Vec3], width: u32, height: u32) -> Result<Vec<u8>, ImageWriteError> {
    let mut out = Vec::new();
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(&to_rgb8(pixels), width, height, ColorType::Rgb8)?;
    Ok(out)
}

/// Write a pixel buffer to `path`, choosing the format by extension
/// (`.ppm` is native; anything else goes through `image`).
pub fn write_image(
    path: impl AsRef<Path>,
    pixels: &[Vec3],
    width: u32,
    height: u32,
) -> Result<(), ImageWriteError> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));
    if is_ppm {
        std::fs::write(path, encode_ppm(pixels, width, height)?)?;
    } else {
        image::save_buffer(path, &to_rgb8(pixels), width, height, ColorType::Rgb8)?;
    }
    log::info!("wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_scaling_and_clamping() {
        let pixels = [Vec3::new(0.0, 0.5, 1.0), Vec3::new(-0.25, 2.0, 0.25)];
        let bytes = to_rgb8(&pixels);
        assert_eq!(bytes, vec![0, 127, 255, 0, 255, 63]);
    }

    #[test]
    fn test_ppm_header_and_payload() {
        let pixels = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let bytes = encode_ppm(&pixels, 2, 1).expect("encode should succeed");

        // Header: magic, width, height, max channel value.
        let header: Vec<&[u8]> = bytes.splitn(5, |&b| b.is_ascii_whitespace()).collect();
        assert_eq!(header[0], b"P6");
        assert_eq!(header[1], b"2");
        assert_eq!(header[2], b"1");
        assert_eq!(header[3], b"255");

        // Payload: 3 bytes per pixel at the very end.
        let payload = &bytes[bytes.len() - 6..];
        assert_eq!(payload, &[255, 0, 0, 0, 0, 255]);
    }
}
