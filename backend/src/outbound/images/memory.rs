//! Image store that keeps uploads in process memory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{ImageSource, ImageStore, ImageStoreError};
use crate::domain::{ImageRef, ImageUpload, StoredImage};

/// Path the HTTP adapter serves stored images from.
pub const DEFAULT_IMAGE_BASE_URL: &str = "/api/v1/images";

/// Stores image bytes by public id and serves them back through
/// [`ImageSource`].
///
/// Used when no image host is configured and by integration tests. Delivery
/// URLs are `{base_url}/{public_id}`.
#[derive(Debug)]
pub struct InMemoryImageStore {
    base_url: String,
    images: Mutex<HashMap<String, StoredImage>>,
}

impl Default for InMemoryImageStore {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_IMAGE_BASE_URL)
    }
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose URLs point at `base_url`, e.g. an absolute origin.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            images: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an image with `public_id` is currently stored.
    pub fn contains(&self, public_id: &str) -> bool {
        self.images
            .lock()
            .map(|images| images.contains_key(public_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.images.lock().map(|images| images.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> ImageStoreError {
    ImageStoreError::unavailable("image store lock poisoned")
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let public_id = Uuid::new_v4().simple().to_string();
        let url = format!("{}/{public_id}", self.base_url);
        self.images.lock().map_err(|_| poisoned())?.insert(
            public_id.clone(),
            StoredImage {
                format: upload.format(),
                bytes: upload.bytes().to_vec(),
            },
        );
        Ok(ImageRef::new(public_id, url))
    }

    async fn delete(&self, image: &ImageRef) -> Result<(), ImageStoreError> {
        self.images
            .lock()
            .map_err(|_| poisoned())?
            .remove(&image.public_id);
        Ok(())
    }
}

#[async_trait]
impl ImageSource for InMemoryImageStore {
    async fn fetch(&self, public_id: &str) -> Result<Option<StoredImage>, ImageStoreError> {
        Ok(self
            .images
            .lock()
            .map_err(|_| poisoned())?
            .get(public_id)
            .cloned())
    }
}
