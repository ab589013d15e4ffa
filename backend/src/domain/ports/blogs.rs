//! Driving ports for blog use-cases.

use async_trait::async_trait;

use crate::domain::{
    BlogChanges, BlogDraft, BlogId, BlogView, CategoryCount, Dashboard, Error, FeedPage,
    FeedQuery, LikeOutcome, SaveOutcome, SessionUser, UserId,
};

/// Blog mutations on behalf of a signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogCommand: Send + Sync {
    /// Publish a post. Only creators may author.
    async fn create(&self, actor: &SessionUser, draft: BlogDraft) -> Result<BlogView, Error>;

    /// Edit a post. Only its author may edit.
    async fn update(
        &self,
        actor: &SessionUser,
        id: &BlogId,
        changes: BlogChanges,
    ) -> Result<BlogView, Error>;

    /// Remove a post. Only its author may delete.
    async fn delete(&self, actor: &SessionUser, id: &BlogId) -> Result<(), Error>;

    async fn toggle_like(&self, actor: &SessionUser, id: &BlogId) -> Result<LikeOutcome, Error>;

    async fn toggle_save(&self, actor: &SessionUser, id: &BlogId) -> Result<SaveOutcome, Error>;
}

/// Blog reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogQuery: Send + Sync {
    /// Single post; `viewer` adds liked/saved flags.
    async fn get(&self, id: &BlogId, viewer: Option<UserId>) -> Result<BlogView, Error>;

    async fn feed(&self, query: &FeedQuery) -> Result<FeedPage<BlogView>, Error>;

    /// Posts bookmarked by `user`.
    async fn saved(&self, user: &UserId) -> Result<Vec<BlogView>, Error>;

    /// Totals and posts for a creator.
    async fn dashboard(&self, actor: &SessionUser) -> Result<Dashboard, Error>;

    async fn categories(&self) -> Result<Vec<CategoryCount>, Error>;
}
