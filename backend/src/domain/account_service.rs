//! Account services: registration, login and profile reads.
//!
//! Photos are uploaded before the account row is written; when the write
//! fails the upload is removed again so the image host holds no orphans.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountCommand, BlogRepository, ImageStore, LoginService, PasswordHasher, UserProfileQuery,
    UserRepository,
};
use crate::domain::service_support::{
    discard_image, duplicate_field, map_blog_repository_error, map_hash_error, map_image_error,
    map_user_repository_error,
};
use crate::domain::{
    AuthorProfile, AuthorSummary, BlogView, Error, LoginCredentials, ProfileUpdate,
    RegistrationDraft, Role, User, UserId,
};

/// Account service implementing the account driving ports.
pub struct AccountService<U: ?Sized, B: ?Sized, I: ?Sized, H: ?Sized> {
    users: Arc<U>,
    blogs: Arc<B>,
    images: Arc<I>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, B: ?Sized, I: ?Sized, H: ?Sized> AccountService<U, B, I, H> {
    pub fn new(
        users: Arc<U>,
        blogs: Arc<B>,
        images: Arc<I>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            blogs,
            images,
            hasher,
            clock,
        }
    }
}

impl<U, B, I, H> AccountService<U, B, I, H>
where
    U: UserRepository + ?Sized,
    B: BlogRepository + ?Sized,
    I: ImageStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn ensure_unique(&self, draft: &RegistrationDraft) -> Result<(), Error> {
        if self
            .users
            .email_taken(&draft.email)
            .await
            .map_err(map_user_repository_error)?
        {
            return Err(duplicate_field("email"));
        }
        if self
            .users
            .phone_taken(&draft.phone, None)
            .await
            .map_err(map_user_repository_error)?
        {
            return Err(duplicate_field("phone"));
        }
        Ok(())
    }
}

#[async_trait]
impl<U, B, I, H> AccountCommand for AccountService<U, B, I, H>
where
    U: UserRepository + ?Sized,
    B: BlogRepository + ?Sized,
    I: ImageStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error> {
        self.ensure_unique(&draft).await?;

        let password_hash = self
            .hasher
            .hash(draft.password.expose())
            .await
            .map_err(map_hash_error)?;
        let photo = self
            .images
            .upload(&draft.photo)
            .await
            .map_err(|err| map_image_error("photo", err))?;

        let user = User {
            id: UserId::random(),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            role: draft.role,
            photo,
            about: None,
            created_at: self.clock.utc(),
        };

        if let Err(error) = self.users.insert(&user, &password_hash).await {
            discard_image(self.images.as_ref(), &user.photo).await;
            return Err(map_user_repository_error(error));
        }
        info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let current = self.load_user(user_id).await?;

        if let Some(phone) = update.phone.as_ref().filter(|phone| **phone != current.phone) {
            let taken = self
                .users
                .phone_taken(phone, Some(*user_id))
                .await
                .map_err(map_user_repository_error)?;
            if taken {
                return Err(duplicate_field("phone"));
            }
        }

        let new_photo = match &update.photo {
            Some(upload) => Some(
                self.images
                    .upload(upload)
                    .await
                    .map_err(|err| map_image_error("photo", err))?,
            ),
            None => None,
        };

        let mut updated = current.clone();
        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(phone) = update.phone {
            updated.phone = phone;
        }
        if let Some(about) = update.about {
            updated.about = if about.as_ref().is_empty() {
                None
            } else {
                Some(about)
            };
        }
        if let Some(photo) = &new_photo {
            updated.photo = photo.clone();
        }

        if let Err(error) = self.users.update(&updated).await {
            if let Some(photo) = &new_photo {
                discard_image(self.images.as_ref(), photo).await;
            }
            return Err(map_user_repository_error(error));
        }
        if new_photo.is_some() {
            discard_image(self.images.as_ref(), &current.photo).await;
        }
        debug!(user_id = %user_id, "profile updated");
        Ok(updated)
    }
}

#[async_trait]
impl<U, B, I, H> LoginService for AccountService<U, B, I, H>
where
    U: UserRepository + ?Sized,
    B: BlogRepository + ?Sized,
    I: ImageStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let invalid = || Error::unauthorized("invalid credentials");

        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
        else {
            return Err(invalid());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !verified {
            return Err(invalid());
        }

        if credentials.role().is_some_and(|requested| requested != stored.role) {
            return Err(Error::invalid_field("role", "role_mismatch", "role mismatch"));
        }

        self.users
            .find_by_id(&stored.user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(invalid)
    }
}

#[async_trait]
impl<U, B, I, H> UserProfileQuery for AccountService<U, B, I, H>
where
    U: UserRepository + ?Sized,
    B: BlogRepository + ?Sized,
    I: ImageStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn me(&self, user: &UserId) -> Result<User, Error> {
        self.load_user(user).await
    }

    async fn author_profile(&self, id: &UserId) -> Result<AuthorProfile, Error> {
        let user = self.load_user(id).await?;
        let blogs = self
            .blogs
            .authored_by(id)
            .await
            .map_err(map_blog_repository_error)?;
        let summary = user.summary();
        let total_likes = blogs.iter().map(|blog| blog.like_count).sum();
        let blogs = blogs
            .into_iter()
            .map(|blog| BlogView::new(blog, summary.clone()))
            .collect();
        Ok(AuthorProfile {
            author: summary,
            role: user.role,
            about: user.about,
            total_likes,
            blogs,
        })
    }

    async fn authors(&self) -> Result<Vec<AuthorSummary>, Error> {
        let creators = self
            .users
            .list_by_role(Role::Creator)
            .await
            .map_err(map_user_repository_error)?;
        Ok(creators.iter().map(User::summary).collect())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
