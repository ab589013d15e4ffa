//! Error mapping and image clean-up shared by the account and blog services.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::ports::{
    BlogRepositoryError, ImageStore, ImageStoreError, PasswordHashError, UserRepositoryError,
};
use crate::domain::{Blog, BlogView, Error, ImageRef, User, UserId};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Duplicate { field } => duplicate_field(&field),
    }
}

pub(crate) fn map_blog_repository_error(error: BlogRepositoryError) -> Error {
    match error {
        BlogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("blog repository unavailable: {message}"))
        }
        BlogRepositoryError::Query { message } => {
            Error::internal(format!("blog repository error: {message}"))
        }
    }
}

/// `field` names the form input that carried the image.
pub(crate) fn map_image_error(field: &str, error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Rejected { message } => {
            Error::invalid_field(field, "image_rejected", format!("image rejected: {message}"))
        }
        ImageStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("image host unavailable: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// 400 for a unique field already held by another account.
pub(crate) fn duplicate_field(field: &str) -> Error {
    Error::invalid_field(
        field,
        &format!("duplicate_{field}"),
        format!("{field} already registered"),
    )
}

/// Delete an image, logging instead of failing.
pub(crate) async fn discard_image<I>(images: &I, image: &ImageRef)
where
    I: ImageStore + ?Sized,
{
    if let Err(error) = images.delete(image).await {
        warn!(public_id = %image.public_id, %error, "failed to delete image");
    }
}

/// Pair blogs with their authors' public cards, preserving order.
pub(crate) fn attach_authors(blogs: Vec<Blog>, authors: &[User]) -> Result<Vec<BlogView>, Error> {
    let cards: HashMap<UserId, &User> = authors.iter().map(|user| (user.id, user)).collect();
    blogs
        .into_iter()
        .map(|blog| {
            let author = cards
                .get(&blog.author)
                .map(|user| user.summary())
                .ok_or_else(|| Error::internal(format!("author of blog {} is missing", blog.id)))?;
            Ok(BlogView::new(blog, author))
        })
        .collect()
}

/// Distinct author ids in first-seen order.
pub(crate) fn author_ids(blogs: &[Blog]) -> Vec<UserId> {
    let mut ids: Vec<UserId> = Vec::new();
    for blog in blogs {
        if !ids.contains(&blog.author) {
            ids.push(blog.author);
        }
    }
    ids
}
