//! Builders turning a [`ServerConfig`] into handler state.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use storyscape::domain::ports::{BlogRepository, ImageSource, ImageStore, UserRepository};
use storyscape::domain::{AccountService, BlogService};
use storyscape::inbound::http::state::{HttpState, HttpStatePorts};
use storyscape::outbound::images::{CloudinaryImageStore, InMemoryImageStore};
use storyscape::outbound::memory::{InMemoryBlogRepository, InMemoryUserRepository};
use storyscape::outbound::persistence::{DbPool, DieselBlogRepository, DieselUserRepository};
use storyscape::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

const IMAGE_HOST_TIMEOUT: Duration = Duration::from_secs(30);

type Repositories = (Arc<dyn UserRepository>, Arc<dyn BlogRepository>);

/// Upload target plus, for the in-process store, the source serving it.
type Images = (Arc<dyn ImageStore>, Option<Arc<dyn ImageSource>>);

fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselBlogRepository::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; accounts and posts live in memory");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryBlogRepository::new()),
            )
        }
    }
}

fn build_image_store(config: &mut ServerConfig, clock: Arc<dyn Clock>) -> std::io::Result<Images> {
    match config.cloudinary.take() {
        Some(credentials) => {
            let store = CloudinaryImageStore::new(credentials, IMAGE_HOST_TIMEOUT, clock)
                .map_err(|err| std::io::Error::other(format!("image host setup failed: {err}")))?;
            Ok((Arc::new(store), None))
        }
        None => {
            warn!("no image host configured; uploads are kept in memory and served by the API");
            let store = Arc::new(InMemoryImageStore::new());
            Ok((store.clone(), Some(store)))
        }
    }
}

/// Wire repositories, the image store and the password hasher into the
/// account and blog services.
///
/// # Errors
///
/// Returns an error when the image host client cannot be built.
pub(super) fn build_http_state(config: &mut ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (users, blogs) = build_repositories(config.db_pool.as_ref());
    let (images, image_source) = build_image_store(config, clock.clone())?;

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        blogs.clone(),
        images.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        clock.clone(),
    ));
    let blog_service = Arc::new(BlogService::new(blogs, users, images, clock));

    let mut state = HttpState::new(HttpStatePorts {
        accounts: accounts.clone(),
        login: accounts.clone(),
        profiles: accounts,
        blogs: blog_service.clone(),
        blog_queries: blog_service,
    })
    .with_max_image_bytes(config.max_image_bytes);
    if let Some(source) = image_source {
        state = state.with_image_source(source);
    }
    Ok(web::Data::new(state))
}
