//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`ImageStore`], [`ImageSource`],
//! [`PasswordHasher`]) are implemented by outbound adapters. Driving ports ([`AccountCommand`],
//! [`LoginService`], [`UserProfileQuery`], [`BlogCommand`], [`BlogQuery`])
//! are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account;
mod blog_repository;
mod blogs;
mod image_store;
mod password_hasher;
mod user_repository;

#[cfg(test)]
pub use account::{MockAccountCommand, MockLoginService, MockUserProfileQuery};
pub use account::{AccountCommand, LoginService, UserProfileQuery};
#[cfg(test)]
pub use blog_repository::MockBlogRepository;
pub use blog_repository::{BlogRepository, BlogRepositoryError};
#[cfg(test)]
pub use blogs::{MockBlogCommand, MockBlogQuery};
pub use blogs::{BlogCommand, BlogQuery};
#[cfg(test)]
pub use image_store::{MockImageSource, MockImageStore};
pub use image_store::{ImageSource, ImageStore, ImageStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
