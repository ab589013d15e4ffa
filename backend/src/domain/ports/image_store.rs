//! Port for the external image host.

use async_trait::async_trait;

use crate::domain::{ImageRef, ImageUpload, StoredImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The host refused the file.
        Rejected { message: String } => "image rejected: {message}",
        /// The host could not be reached or failed.
        Unavailable { message: String } => "image host unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload a validated image and return its public reference.
    async fn upload(&self, upload: &ImageUpload) -> Result<ImageRef, ImageStoreError>;

    /// Remove an image from the host.
    async fn delete(&self, image: &ImageRef) -> Result<(), ImageStoreError>;
}

/// Read side of an image store that delivers files itself rather than
/// through an external host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Stored bytes for `public_id`, or `None` when unknown.
    async fn fetch(&self, public_id: &str) -> Result<Option<StoredImage>, ImageStoreError>;
}
