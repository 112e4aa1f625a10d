/// Profile picture normalization
///
/// Uploads are accepted by file name extension and size, decoded, scaled and
/// center-cropped to cover a 250x250 square, and re-encoded as PNG. Only the
/// normalized PNG is ever stored.

use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat};

/// Largest accepted upload, in bytes
pub const MAX_AVATAR_BYTES: usize = 1_000_000;

/// Edge length of the stored square avatar
pub const AVATAR_SIZE: u32 = 250;

const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Please upload an image.")]
    UnsupportedType,

    #[error("File too large (max {MAX_AVATAR_BYTES} bytes)")]
    TooLarge,

    #[error("Could not read image: {0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),
}

/// Checks the upload's name and size before any decoding
pub fn check_upload(file_name: &str, len: usize) -> Result<(), AvatarError> {
    let lower = file_name.to_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Err(AvatarError::UnsupportedType);
    }
    if len > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge);
    }
    Ok(())
}

/// Validates, resizes and re-encodes an upload into PNG bytes
///
/// CPU-bound; call from a blocking thread.
pub fn normalize_avatar(file_name: &str, bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    check_upload(file_name, bytes.len())?;

    let image = image::load_from_memory(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;
    let resized = image.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    Ok(out.into_inner())
}
