use crate::PaletteError;
use image::{DynamicImage, ImageFormat};

/// Detects the container format from the leading bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Decodes an image, choosing the codec by content rather than by URL suffix.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PaletteError> {
    let format = sniff_format(bytes)
        .ok_or_else(|| PaletteError::Decode("unrecognized image container".to_string()))?;

    Ok(image::load_from_memory_with_format(bytes, format)?)
}
