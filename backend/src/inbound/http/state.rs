//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! tests can swap in mocks without touching I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_MAX_IMAGE_BYTES;
use crate::domain::ports::{
    AccountCommand, BlogCommand, BlogQuery, ImageSource, LoginService, UserProfileQuery,
};

/// Port bundle handed to [`HttpState::new`].
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub login: Arc<dyn LoginService>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub blogs: Arc<dyn BlogCommand>,
    pub blog_queries: Arc<dyn BlogQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub login: Arc<dyn LoginService>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub blogs: Arc<dyn BlogCommand>,
    pub blog_queries: Arc<dyn BlogQuery>,
    /// Upper bound for any single uploaded image.
    pub max_image_bytes: usize,
    /// Set when uploads are kept in process and served by `/images/{id}`.
    pub image_source: Option<Arc<dyn ImageSource>>,
}

impl HttpState {
    /// State with the default image size limit.
    ///
    /// # Examples
    /// ```ignore
    /// let service = Arc::new(AccountService::new(users, blogs, images, hasher, clock));
    /// let blog_service = Arc::new(BlogService::new(blog_repo, user_repo, images, clock));
    /// let state = HttpState::new(HttpStatePorts {
    ///     accounts: service.clone(),
    ///     login: service.clone(),
    ///     profiles: service,
    ///     blogs: blog_service.clone(),
    ///     blog_queries: blog_service,
    /// });
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            login,
            profiles,
            blogs,
            blog_queries,
        } = ports;
        Self {
            accounts,
            login,
            profiles,
            blogs,
            blog_queries,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            image_source: None,
        }
    }

    #[must_use]
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    #[must_use]
    pub fn with_image_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.image_source = Some(source);
        self
    }
}
