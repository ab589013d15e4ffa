//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Email, Phone, Role, User, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (`email` or `phone`) already holds this value.
        Duplicate { field: String } => "user {field} already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account together with its password hash.
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch several users at once; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError>;

    /// Load login material for an email address.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError>;

    async fn email_taken(&self, email: &Email) -> Result<bool, UserRepositoryError>;

    /// Whether `phone` belongs to an account other than `except`.
    async fn phone_taken(
        &self,
        phone: &Phone,
        except: Option<UserId>,
    ) -> Result<bool, UserRepositoryError>;

    /// Overwrite profile fields (name, phone, about, photo).
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// All users holding `role`, oldest first.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError>;
}
