//! Blog services implementing the blog command and query ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{BlogCommand, BlogQuery, BlogRepository, ImageStore, UserRepository};
use crate::domain::service_support::{
    attach_authors, author_ids, discard_image, map_blog_repository_error, map_image_error,
    map_user_repository_error,
};
use crate::domain::{
    AuthorSummary, Blog, BlogChanges, BlogDraft, BlogId, BlogView, CategoryCount, Dashboard,
    Error, FeedPage, FeedQuery, LikeOutcome, SaveOutcome, SessionUser, UserId,
};

pub struct BlogService<B: ?Sized, U: ?Sized, I: ?Sized> {
    blogs: Arc<B>,
    users: Arc<U>,
    images: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<B: ?Sized, U: ?Sized, I: ?Sized> BlogService<B, U, I> {
    pub fn new(blogs: Arc<B>, users: Arc<U>, images: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            blogs,
            users,
            images,
            clock,
        }
    }
}

impl<B, U, I> BlogService<B, U, I>
where
    B: BlogRepository + ?Sized,
    U: UserRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    async fn load_blog(&self, id: &BlogId) -> Result<Blog, Error> {
        self.blogs
            .find_by_id(id)
            .await
            .map_err(map_blog_repository_error)?
            .ok_or_else(|| Error::not_found("blog not found"))
    }

    /// Load a blog the actor is allowed to change.
    async fn load_owned(&self, actor: &SessionUser, id: &BlogId) -> Result<Blog, Error> {
        let blog = self.load_blog(id).await?;
        if blog.author != actor.id {
            return Err(Error::forbidden("only the author can modify this blog"));
        }
        Ok(blog)
    }

    async fn author_card(&self, id: &UserId) -> Result<AuthorSummary, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .map(|user| user.summary())
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    async fn with_authors(&self, blogs: Vec<Blog>) -> Result<Vec<BlogView>, Error> {
        if blogs.is_empty() {
            return Ok(Vec::new());
        }
        let authors = self
            .users
            .find_by_ids(&author_ids(&blogs))
            .await
            .map_err(map_user_repository_error)?;
        attach_authors(blogs, &authors)
    }

    fn require_creator(actor: &SessionUser) -> Result<(), Error> {
        if actor.role.can_author() {
            Ok(())
        } else {
            Err(Error::forbidden("only creators can publish blogs"))
        }
    }
}

#[async_trait]
impl<B, U, I> BlogCommand for BlogService<B, U, I>
where
    B: BlogRepository + ?Sized,
    U: UserRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    async fn create(&self, actor: &SessionUser, draft: BlogDraft) -> Result<BlogView, Error> {
        Self::require_creator(actor)?;
        let author = self.author_card(&actor.id).await?;

        let image = self
            .images
            .upload(&draft.image)
            .await
            .map_err(|err| map_image_error("image", err))?;
        let now = self.clock.utc();
        let blog = Blog {
            id: BlogId::random(),
            title: draft.title,
            category: draft.category,
            body: draft.body,
            author: actor.id,
            image,
            like_count: 0,
            created_at: now,
            updated_at: now,
        };

        if let Err(error) = self.blogs.insert(&blog).await {
            discard_image(self.images.as_ref(), &blog.image).await;
            return Err(map_blog_repository_error(error));
        }
        info!(blog_id = %blog.id, author = %actor.id, "blog published");
        Ok(BlogView::new(blog, author))
    }

    async fn update(
        &self,
        actor: &SessionUser,
        id: &BlogId,
        changes: BlogChanges,
    ) -> Result<BlogView, Error> {
        let current = self.load_owned(actor, id).await?;
        let author = self.author_card(&actor.id).await?;
        if changes.is_empty() {
            return Ok(BlogView::new(current, author));
        }

        let new_image = match &changes.image {
            Some(upload) => Some(
                self.images
                    .upload(upload)
                    .await
                    .map_err(|err| map_image_error("image", err))?,
            ),
            None => None,
        };

        let mut updated = current.clone();
        if let Some(title) = changes.title {
            updated.title = title;
        }
        if let Some(category) = changes.category {
            updated.category = category;
        }
        if let Some(body) = changes.body {
            updated.body = body;
        }
        if let Some(image) = &new_image {
            updated.image = image.clone();
        }
        updated.updated_at = self.clock.utc();

        if let Err(error) = self.blogs.update(&updated).await {
            if let Some(image) = &new_image {
                discard_image(self.images.as_ref(), image).await;
            }
            return Err(map_blog_repository_error(error));
        }
        if new_image.is_some() {
            discard_image(self.images.as_ref(), &current.image).await;
        }
        Ok(BlogView::new(updated, author))
    }

    async fn delete(&self, actor: &SessionUser, id: &BlogId) -> Result<(), Error> {
        let blog = self.load_owned(actor, id).await?;
        let removed = self
            .blogs
            .delete(id)
            .await
            .map_err(map_blog_repository_error)?;
        if !removed {
            return Err(Error::not_found("blog not found"));
        }
        discard_image(self.images.as_ref(), &blog.image).await;
        info!(blog_id = %id, "blog deleted");
        Ok(())
    }

    async fn toggle_like(&self, actor: &SessionUser, id: &BlogId) -> Result<LikeOutcome, Error> {
        self.load_blog(id).await?;
        self.blogs
            .toggle_like(id, &actor.id)
            .await
            .map_err(map_blog_repository_error)
    }

    async fn toggle_save(&self, actor: &SessionUser, id: &BlogId) -> Result<SaveOutcome, Error> {
        self.load_blog(id).await?;
        let saved = self
            .blogs
            .toggle_save(&actor.id, id)
            .await
            .map_err(map_blog_repository_error)?;
        Ok(SaveOutcome { saved })
    }
}

#[async_trait]
impl<B, U, I> BlogQuery for BlogService<B, U, I>
where
    B: BlogRepository + ?Sized,
    U: UserRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    async fn get(&self, id: &BlogId, viewer: Option<UserId>) -> Result<BlogView, Error> {
        let blog = self.load_blog(id).await?;
        let view = self
            .with_authors(vec![blog])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("blog view missing"))?;
        let Some(viewer) = viewer else {
            return Ok(view);
        };
        let liked = self
            .blogs
            .is_liked(id, &viewer)
            .await
            .map_err(map_blog_repository_error)?;
        let saved = self
            .blogs
            .is_saved(&viewer, id)
            .await
            .map_err(map_blog_repository_error)?;
        Ok(view.with_viewer_state(liked, saved))
    }

    async fn feed(&self, query: &FeedQuery) -> Result<FeedPage<BlogView>, Error> {
        let page = self
            .blogs
            .feed(query)
            .await
            .map_err(map_blog_repository_error)?;
        let FeedPage {
            items,
            page,
            limit,
            total,
            total_pages,
        } = page;
        Ok(FeedPage {
            items: self.with_authors(items).await?,
            page,
            limit,
            total,
            total_pages,
        })
    }

    async fn saved(&self, user: &UserId) -> Result<Vec<BlogView>, Error> {
        let blogs = self
            .blogs
            .saved_by(user)
            .await
            .map_err(map_blog_repository_error)?;
        self.with_authors(blogs).await
    }

    async fn dashboard(&self, actor: &SessionUser) -> Result<Dashboard, Error> {
        Self::require_creator(actor)?;
        let author = self.author_card(&actor.id).await?;
        let blogs = self
            .blogs
            .authored_by(&actor.id)
            .await
            .map_err(map_blog_repository_error)?;
        let total_likes = blogs.iter().map(|blog| blog.like_count).sum();
        let total_blogs = blogs.len() as u64;
        Ok(Dashboard {
            total_blogs,
            total_likes,
            blogs: blogs
                .into_iter()
                .map(|blog| BlogView::new(blog, author.clone()))
                .collect(),
        })
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, Error> {
        self.blogs
            .categories()
            .await
            .map_err(map_blog_repository_error)
    }
}

#[cfg(test)]
#[path = "blog_service_tests.rs"]
mod tests;
