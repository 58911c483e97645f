//! Image payloads sent as data URIs

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use uuid::Uuid;

/// Largest accepted decoded image
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// A decoded upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub data: Bytes,
}

impl ImageUpload {
    /// Parse `data:<mime>;base64,<payload>`
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let rest = uri.trim().strip_prefix("data:").ok_or(ImageError::NotADataUri)?;
        let (meta, payload) = rest.split_once(',').ok_or(ImageError::NotADataUri)?;
        let mime = meta.strip_suffix(";base64").ok_or(ImageError::NotBase64)?;

        let (mime_type, extension) = ACCEPTED_TYPES
            .iter()
            .copied()
            .find(|(accepted, _)| accepted.eq_ignore_ascii_case(mime))
            .ok_or_else(|| ImageError::UnsupportedType(mime.to_string()))?;

        let data = STANDARD.decode(payload).map_err(|_| ImageError::NotBase64)?;
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge(data.len()));
        }

        Ok(Self {
            mime_type,
            extension,
            data: Bytes::from(data),
        })
    }

    /// Object name `<user>/<unix millis>.<ext>`
    pub fn object_name(&self, owner: Uuid, unix_millis: u64) -> String {
        format!("{}/{}.{}", owner, unix_millis, self.extension)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImageError {
    #[error("Image must be a data URI")]
    NotADataUri,

    #[error("Image data must be base64 encoded")]
    NotBase64,

    #[error("Unsupported image type {0}; use JPEG, PNG or WebP")]
    UnsupportedType(String),

    #[error("Image is empty")]
    Empty,

    #[error("Image is {0} bytes; the limit is 5 MB")]
    TooLarge(usize),
}
