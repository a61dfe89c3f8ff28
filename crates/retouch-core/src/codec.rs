//! Container decode/encode boundary.
//!
//! Accepts raw image file bytes (PNG, JPEG, BMP, WebP, whatever the
//! `image` crate can decode) and produces [`PixelBuffer`]s and
//! [`Mask`]s; encodes results back to PNG. Channel order is RGB on both
//! sides.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::types::{EditError, Mask, PixelBuffer};

/// Decode image file bytes into an RGB buffer. Alpha is dropped.
///
/// # Errors
///
/// Returns [`EditError::Decode`] if `bytes` is empty, the format is
/// unrecognized, or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, EditError> {
    if bytes.is_empty() {
        return Err(EditError::Decode("input image data is empty".to_string()));
    }
    let image = image::load_from_memory(bytes).map_err(|e| EditError::Decode(e.to_string()))?;
    PixelBuffer::try_from(image.to_rgb8())
}

/// Decode image file bytes into a selection mask (the luma of the
/// decoded image).
///
/// # Errors
///
/// Returns [`EditError::Decode`] under the same conditions as
/// [`decode`].
pub fn decode_mask(bytes: &[u8]) -> Result<Mask, EditError> {
    if bytes.is_empty() {
        return Err(EditError::Decode("mask data is empty".to_string()));
    }
    let image = image::load_from_memory(bytes).map_err(|e| EditError::Decode(e.to_string()))?;
    Mask::try_from(image.to_luma8())
}

/// Encode a buffer as PNG.
///
/// # Errors
///
/// Returns [`EditError::Encode`] if the PNG encoder fails.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, EditError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EditError::Encode(e.to_string()))?;
    Ok(buf)
}
