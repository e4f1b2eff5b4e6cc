//! Square-image validation.

use crate::error::PuzzleError;

/// Decodes `bytes` and returns the side length of a square image.
///
/// The whole image is decoded, not just the header, so truncated or
/// corrupt files are rejected too. Only PNG and JPEG are supported.
///
/// # Errors
///
/// Returns [`PuzzleError::Validation`] if the bytes are not a decodable
/// image or its width and height differ.
pub fn square_side(bytes: &[u8]) -> Result<u32, PuzzleError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PuzzleError::Validation(format!("failed to decode image: {e}")))?;
    let (width, height) = (image.width(), image.height());
    if width != height {
        return Err(PuzzleError::Validation(format!(
            "image must be square (got {width}x{height})"
        )));
    }
    Ok(width)
}
