//! Reqwest-backed Cloudinary image store.
//!
//! Uploads use the signed upload API: the request parameters (minus `file`,
//! `api_key` and the signature fields) are sorted by name, joined as
//! `k=v&k=v`, suffixed with the API secret and hashed with SHA-256.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageRef, ImageUpload};

const API_BASE: &str = "https://api.cloudinary.com/v1_1/";

/// Account credentials and upload placement.
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
    /// Folder prefix for uploaded public ids.
    pub folder: Option<String>,
}

/// Image store talking to one Cloudinary cloud.
pub struct CloudinaryImageStore {
    client: Client,
    upload_url: Url,
    destroy_url: Url,
    api_key: String,
    api_secret: Zeroizing<String>,
    folder: Option<String>,
    clock: Arc<dyn Clock>,
}

impl CloudinaryImageStore {
    /// Build a store with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the cloud name does not form a valid URL or the
    /// reqwest client cannot be constructed.
    pub fn new(
        credentials: CloudinaryCredentials,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ImageStoreError> {
        let base = Url::parse(API_BASE)
            .and_then(|base| base.join(&format!("{}/image/", credentials.cloud_name)))
            .map_err(|err| ImageStoreError::unavailable(format!("invalid cloud name: {err}")))?;
        let upload_url = base
            .join("upload")
            .map_err(|err| ImageStoreError::unavailable(err.to_string()))?;
        let destroy_url = base
            .join("destroy")
            .map_err(|err| ImageStoreError::unavailable(err.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ImageStoreError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            upload_url,
            destroy_url,
            api_key: credentials.api_key,
            api_secret: credentials.api_secret,
            folder: credentials.folder.filter(|folder| !folder.trim().is_empty()),
            clock,
        })
    }

    fn timestamp(&self) -> String {
        self.clock.utc().timestamp().to_string()
    }

    async fn send(&self, url: &Url, form: Form) -> Result<Vec<u8>, ImageStoreError> {
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

/// Hex SHA-256 signature over sorted `params` followed by `secret`.
pub(crate) fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_upload(body: &[u8]) -> Result<ImageRef, ImageStoreError> {
    let decoded: UploadResponse = serde_json::from_slice(body).map_err(|err| {
        ImageStoreError::unavailable(format!("invalid upload response: {err}"))
    })?;
    Ok(ImageRef::new(decoded.public_id, decoded.secure_url))
}

fn parse_destroy(body: &[u8]) -> Result<(), ImageStoreError> {
    let decoded: DestroyResponse = serde_json::from_slice(body).map_err(|err| {
        ImageStoreError::unavailable(format!("invalid destroy response: {err}"))
    })?;
    match decoded.result.as_str() {
        // Already gone counts as deleted.
        "ok" | "not found" => Ok(()),
        other => Err(ImageStoreError::unavailable(format!(
            "destroy returned {other}"
        ))),
    }
}

fn map_transport_error(error: reqwest::Error) -> ImageStoreError {
    ImageStoreError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageStoreError {
    let detail = serde_json::from_slice::<ErrorResponse>(body)
        .map(|decoded| decoded.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).chars().take(160).collect());
    let message = format!("status {}: {detail}", status.as_u16());
    if status == StatusCode::BAD_REQUEST {
        ImageStoreError::rejected(message)
    } else {
        ImageStoreError::unavailable(message)
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let timestamp = self.timestamp();
        let mut params = vec![("timestamp", timestamp.as_str())];
        if let Some(folder) = self.folder.as_deref() {
            params.push(("folder", folder));
        }
        let signature = sign(&params, &self.api_secret);

        let file = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_owned())
            .mime_str(upload.content_type())
            .map_err(|err| ImageStoreError::rejected(err.to_string()))?;
        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key.to_owned(), value.to_owned());
        }

        let body = self.send(&self.upload_url, form).await?;
        let image = parse_upload(&body)?;
        debug!(public_id = %image.public_id, "image uploaded");
        Ok(image)
    }

    async fn delete(&self, image: &ImageRef) -> Result<(), ImageStoreError> {
        let timestamp = self.timestamp();
        let params = [
            ("public_id", image.public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign(&params, &self.api_secret);
        let form = Form::new()
            .text("public_id", image.public_id.clone())
            .text("timestamp", timestamp.clone())
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let body = self.send(&self.destroy_url, form).await?;
        parse_destroy(&body)
    }
}
