//! Image references and validated uploads.
//!
//! Photos and blog cover images live on the image host; the domain only
//! keeps the host's public identifier and delivery URL.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default upper bound for a single uploaded image.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Reference to an image stored on the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Host-side identifier used for deletion.
    #[schema(example = "storyscape/3fa85f64")]
    pub public_id: String,
    /// Public delivery URL.
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/storyscape/3fa85f64.png")]
    pub url: String,
}

impl ImageRef {
    pub fn new(public_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            url: url.into(),
        }
    }
}

/// Image bytes kept by a store that serves its own files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Resolve a declared MIME type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Sniff the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP")
        {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Reasons an upload is refused before reaching the image host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    #[error("image file is empty")]
    Empty,
    #[error("image exceeds the {max} byte limit")]
    TooLarge { max: usize },
    #[error("unsupported image type: {content_type}")]
    UnsupportedType { content_type: String },
    #[error("image content does not match its declared type")]
    ContentMismatch,
}

impl ImageValidationError {
    /// Machine-readable code used in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty_image",
            Self::TooLarge { .. } => "image_too_large",
            Self::UnsupportedType { .. } => "unsupported_image_type",
            Self::ContentMismatch => "image_content_mismatch",
        }
    }
}

/// Validated image bytes ready to hand to an [`crate::domain::ports::ImageStore`].
///
/// ## Invariants
/// - `bytes` is non-empty and within the configured size limit.
/// - The file signature matches the declared content type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an uploaded file.
    ///
    /// # Examples
    /// ```
    /// use storyscape::domain::ImageUpload;
    ///
    /// let png = b"\x89PNG\r\n\x1a\n0000".to_vec();
    /// let upload = ImageUpload::try_new("cover.png", "image/png", png, 1024).unwrap();
    /// assert_eq!(upload.content_type(), "image/png");
    /// ```
    pub fn try_new(
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ImageValidationError> {
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageValidationError::TooLarge { max: max_bytes });
        }
        let declared = ImageFormat::from_content_type(content_type).ok_or_else(|| {
            ImageValidationError::UnsupportedType {
                content_type: content_type.to_owned(),
            }
        })?;
        if ImageFormat::sniff(&bytes) != Some(declared) {
            return Err(ImageValidationError::ContentMismatch);
        }

        let file_name = file_name.into();
        let file_name = if file_name.trim().is_empty() {
            format!("upload.{}", declared.extension())
        } else {
            file_name
        };

        Ok(Self {
            file_name,
            format: declared,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nrest";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00];

    #[rstest]
    #[case(PNG, "image/png", ImageFormat::Png)]
    #[case(JPEG, "image/jpeg", ImageFormat::Jpeg)]
    #[case(JPEG, "IMAGE/JPG", ImageFormat::Jpeg)]
    #[case(b"GIF89a....", "image/gif", ImageFormat::Gif)]
    #[case(b"RIFF\0\0\0\0WEBPVP8 ", "image/webp", ImageFormat::Webp)]
    fn accepts_matching_signatures(
        #[case] bytes: &[u8],
        #[case] content_type: &str,
        #[case] expected: ImageFormat,
    ) {
        let upload = ImageUpload::try_new("x", content_type, bytes.to_vec(), 1024)
            .expect("valid upload");
        assert_eq!(upload.format(), expected);
    }

    #[rstest]
    fn rejects_empty_files() {
        let err = ImageUpload::try_new("a.png", "image/png", Vec::new(), 10).expect_err("empty");
        assert_eq!(err, ImageValidationError::Empty);
    }

    #[rstest]
    fn rejects_oversized_files() {
        let err = ImageUpload::try_new("a.png", "image/png", PNG.to_vec(), 4).expect_err("big");
        assert_eq!(err, ImageValidationError::TooLarge { max: 4 });
    }

    #[rstest]
    fn rejects_unsupported_types() {
        let err = ImageUpload::try_new("a.svg", "image/svg+xml", PNG.to_vec(), 1024)
            .expect_err("svg");
        assert_eq!(err.code(), "unsupported_image_type");
    }

    #[rstest]
    fn rejects_declared_type_mismatch() {
        let err =
            ImageUpload::try_new("a.png", "image/png", JPEG.to_vec(), 1024).expect_err("mismatch");
        assert_eq!(err, ImageValidationError::ContentMismatch);
    }

    #[rstest]
    fn blank_file_names_get_a_default() {
        let upload = ImageUpload::try_new("  ", "image/png", PNG.to_vec(), 1024).expect("valid");
        assert_eq!(upload.file_name(), "upload.png");
    }
}
