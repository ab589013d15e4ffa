//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, plus the services that implement the driving ports. Types keep
//! their invariants in constructors; serde contracts live on each type.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Blog, BlogView, FeedQuery, FeedPage: core data model.
//! - AccountService, BlogService: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod blog;
pub mod blog_service;
pub mod error;
pub mod feed;
pub mod image;
pub mod ports;
mod service_support;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, Password,
    ProfileUpdate, RegistrationDraft, SessionUser,
};
pub use self::blog::{
    AuthorProfile, Blog, BlogBody, BlogChanges, BlogDraft, BlogId, BlogTitle, BlogValidationError,
    BlogView, Category, CategoryCount, Dashboard, LikeOutcome, SaveOutcome,
};
pub use self::blog_service::BlogService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::feed::{
    DEFAULT_PAGE_SIZE, FeedPage, FeedQuery, FeedQueryError, FeedSort, MAX_PAGE_SIZE,
};
pub use self::image::{
    DEFAULT_MAX_IMAGE_BYTES, ImageFormat, ImageRef, ImageUpload, ImageValidationError,
    StoredImage,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    About, AuthorSummary, Email, Phone, Role, User, UserCredentials, UserId, UserName,
    UserValidationError,
};
