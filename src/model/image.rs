use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Image types accepted for inline uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Largest inline upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A listing image: either a plain URI or an inline `data:` URI carrying the
/// uploaded bytes as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn uri(uri: impl Into<String>) -> Self {
        ImageRef(uri.into())
    }

    /// Inline an uploaded image.
    pub fn inline(mime: &str, bytes: &[u8]) -> Result<Self, ValidationError> {
        if !ALLOWED_IMAGE_TYPES.contains(&mime) {
            return Err(ValidationError::single(
                "images",
                format!("unsupported image type {}", mime),
            ));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::single(
                "images",
                format!("image larger than {} bytes", MAX_IMAGE_BYTES),
            ));
        }
        Ok(ImageRef(format!("data:{};base64,{}", mime, STANDARD.encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Mime type and bytes of an inline image; `None` for plain URIs or
    /// malformed payloads.
    pub fn decode(&self) -> Option<(String, Vec<u8>)> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        let bytes = STANDARD.decode(payload).ok()?;
        Some((mime.to_string(), bytes))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inline() {
            write!(f, "<inline image, {} chars>", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_image_decodes_back() {
        let img = ImageRef::inline("image/png", &[0x89, b'P', b'N', b'G']).unwrap();
        assert!(img.is_inline());
        assert!(img.as_str().starts_with("data:image/png;base64,"));
        let (mime, bytes) = img.decode().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = ImageRef::inline("application/pdf", b"%PDF").unwrap_err();
        assert!(err.has_field("images"));
    }

    #[test]
    fn plain_uri_has_no_payload() {
        let img = ImageRef::uri("genshin1.jpg");
        assert!(!img.is_inline());
        assert!(img.decode().is_none());
        assert_eq!(img.to_string(), "genshin1.jpg");
    }
}
