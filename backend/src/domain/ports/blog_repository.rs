//! Port for blog persistence, likes and bookmarks.
//!
//! Like toggles must update the stored like counter atomically with the
//! like record so `Blog::like_count` always equals the number of likers.

use async_trait::async_trait;

use crate::domain::{Blog, BlogId, CategoryCount, FeedPage, FeedQuery, LikeOutcome, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blog repository adapters.
    pub enum BlogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "blog repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "blog repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError>;

    /// Overwrite title, category, body, image and `updated_at`.
    async fn update(&self, blog: &Blog) -> Result<(), BlogRepositoryError>;

    /// Remove a blog with its likes and bookmarks. Returns `false` when absent.
    async fn delete(&self, id: &BlogId) -> Result<bool, BlogRepositoryError>;

    async fn find_by_id(&self, id: &BlogId) -> Result<Option<Blog>, BlogRepositoryError>;

    /// Filter, order and paginate the public feed.
    async fn feed(&self, query: &FeedQuery) -> Result<FeedPage<Blog>, BlogRepositoryError>;

    /// Like when not yet liked by `user`, otherwise unlike.
    async fn toggle_like(
        &self,
        blog: &BlogId,
        user: &UserId,
    ) -> Result<LikeOutcome, BlogRepositoryError>;

    async fn is_liked(&self, blog: &BlogId, user: &UserId) -> Result<bool, BlogRepositoryError>;

    /// Bookmark or un-bookmark; returns the new saved state.
    async fn toggle_save(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError>;

    async fn is_saved(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError>;

    /// Blogs bookmarked by `user`, most recently saved first.
    async fn saved_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError>;

    /// Blogs written by `user`, newest first.
    async fn authored_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError>;

    /// Post counts per category, grouped case-insensitively, largest first.
    async fn categories(&self) -> Result<Vec<CategoryCount>, BlogRepositoryError>;
}
