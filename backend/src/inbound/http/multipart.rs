//! Size-limited `multipart/form-data` reader.
//!
//! Registration, profile edits and blog writes arrive as forms mixing text
//! inputs with one image part. [`read_form`] buffers the whole form, refusing
//! unknown or repeated inputs and anything over its byte limits, then hands
//! out text values and validated [`ImageUpload`]s by field name.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use tracing::debug;

use super::validation::{image_error, missing_field_error};
use crate::domain::{Error, ImageUpload, ImageValidationError};

/// Largest accepted text input; blog bodies are the biggest.
pub(crate) const MAX_TEXT_BYTES: usize = 512 * 1024;

/// Names a form may contain and which of them carry files.
pub(crate) struct FormShape {
    pub text: &'static [&'static str],
    pub files: &'static [&'static str],
}

struct RawFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Buffered form contents.
pub(crate) struct FormData {
    text: HashMap<&'static str, String>,
    files: HashMap<&'static str, RawFile>,
    max_file_bytes: usize,
}

impl FormData {
    /// Text input if it was sent.
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub(crate) fn require_text(&self, name: &str) -> Result<&str, Error> {
        self.text(name).ok_or_else(|| missing_field_error(name))
    }

    /// Validated image if a non-empty file was sent.
    ///
    /// Browsers submit an empty part when no file is chosen; that counts as
    /// absent.
    pub(crate) fn image(&mut self, name: &str) -> Result<Option<ImageUpload>, Error> {
        let Some(raw) = self.files.remove(name) else {
            return Ok(None);
        };
        if raw.bytes.is_empty() && raw.file_name.is_empty() {
            return Ok(None);
        }
        ImageUpload::try_new(
            raw.file_name,
            &raw.content_type,
            raw.bytes,
            self.max_file_bytes,
        )
        .map(Some)
        .map_err(|error| image_error(name, &error))
    }

    pub(crate) fn require_image(&mut self, name: &str) -> Result<ImageUpload, Error> {
        self.image(name)?.ok_or_else(|| missing_field_error(name))
    }
}

/// Buffer every part of `payload`.
///
/// # Errors
///
/// `400` with `{ field, code }` details for unknown, repeated or oversized
/// inputs and for non-UTF-8 text; `400` without details when the body is not
/// valid multipart.
pub(crate) async fn read_form(
    mut payload: Multipart,
    shape: &FormShape,
    max_file_bytes: usize,
) -> Result<FormData, Error> {
    let mut form = FormData {
        text: HashMap::new(),
        files: HashMap::new(),
        max_file_bytes,
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        if let Some(known) = lookup(shape.files, &name) {
            if form.files.contains_key(known) {
                return Err(repeated(known));
            }
            let file_name = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .unwrap_or_default()
                .to_owned();
            let content_type = field
                .content_type()
                .map(|mime| mime.essence_str().to_owned())
                .unwrap_or_default();
            let bytes = read_limited(&mut field, max_file_bytes)
                .await?
                .ok_or_else(|| image_error(known, &ImageValidationError::TooLarge {
                    max: max_file_bytes,
                }))?;
            debug!(field = known, size = bytes.len(), "buffered file part");
            form.files.insert(
                known,
                RawFile {
                    file_name,
                    content_type,
                    bytes,
                },
            );
        } else if let Some(known) = lookup(shape.text, &name) {
            if form.text.contains_key(known) {
                return Err(repeated(known));
            }
            let bytes = read_limited(&mut field, MAX_TEXT_BYTES)
                .await?
                .ok_or_else(|| {
                    Error::invalid_field(known, "field_too_large", format!("{known} is too large"))
                })?;
            let value = String::from_utf8(bytes).map_err(|_| {
                Error::invalid_field(known, "invalid_encoding", format!("{known} must be UTF-8"))
            })?;
            form.text.insert(known, value);
        } else {
            return Err(Error::invalid_field(
                &name,
                "unknown_field",
                format!("unexpected form field: {name}"),
            ));
        }
    }
    Ok(form)
}

fn lookup(names: &'static [&'static str], name: &str) -> Option<&'static str> {
    names.iter().copied().find(|candidate| *candidate == name)
}

/// Drain `field`; `None` once it passes `limit` bytes.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > limit {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(Some(buffer))
}

fn repeated(name: &str) -> Error {
    Error::invalid_field(name, "duplicate_field", format!("{name} was sent more than once"))
}

fn malformed(error: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("invalid multipart body: {error}"))
}
