//! Photo normalization
//!
//! Telegram photos are usually JPEG already, but decoding and re-encoding
//! guarantees an RGB JPEG whatever the client sent (PNG with alpha, WebP,
//! grayscale).

use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// JPEG quality used when re-encoding photos
const JPEG_QUALITY: u8 = 90;

/// Errors while preparing a photo for the AI
#[derive(Debug, Error)]
pub enum MediaError {
    /// The bytes are not an image in a supported format
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    /// Re-encoding as JPEG failed
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decodes `bytes`, converts to 3-channel RGB and encodes as JPEG.
///
/// # Errors
///
/// Returns `MediaError::Decode` if the bytes are not a readable image.
pub fn normalize_photo(bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
    let decoded = image::load_from_memory(bytes).map_err(MediaError::Decode)?;
    let rgb = decoded.to_rgb8();

    let mut out = Vec::with_capacity(bytes.len());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(MediaError::Encode)?;
    Ok(out)
}
