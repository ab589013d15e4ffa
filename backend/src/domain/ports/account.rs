//! Driving ports for account use-cases.
//!
//! HTTP handlers call these to register, sign in and read profiles without
//! importing persistence or image-host details. Tests substitute mocks.

use async_trait::async_trait;

use crate::domain::{
    AuthorProfile, AuthorSummary, Error, LoginCredentials, ProfileUpdate, RegistrationDraft, User,
    UserId,
};

/// Account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account, uploading its photo.
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error>;

    /// Apply profile edits for the signed-in user.
    async fn update_profile(&self, user: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the account they unlock.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Full profile of the signed-in user.
    async fn me(&self, user: &UserId) -> Result<User, Error>;

    /// Public author page with their posts.
    async fn author_profile(&self, id: &UserId) -> Result<AuthorProfile, Error>;

    /// Every creator account.
    async fn authors(&self) -> Result<Vec<AuthorSummary>, Error>;
}
