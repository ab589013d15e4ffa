//! In-memory `UserRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Email, Phone, Role, User, UserCredentials, UserId};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// User store backed by a `HashMap`.
///
/// Email and phone uniqueness is enforced on insert and update the same way
/// the database constraints do.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, StoredUser>>, UserRepositoryError> {
        self.users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }
}

fn conflicting_field(
    users: &HashMap<UserId, StoredUser>,
    candidate: &User,
) -> Option<&'static str> {
    let others = || users.values().filter(|s| s.user.id != candidate.id);
    if others().any(|s| s.user.email == candidate.email) {
        return Some("email");
    }
    if others().any(|s| s.user.phone == candidate.phone) {
        return Some("phone");
    }
    None
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        if let Some(field) = conflicting_field(&users, user) {
            return Err(UserRepositoryError::duplicate(field));
        }
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        let users = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| UserCredentials {
                user_id: stored.user.id,
                role: stored.user.role,
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn email_taken(&self, email: &Email) -> Result<bool, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .any(|stored| &stored.user.email == email))
    }

    async fn phone_taken(
        &self,
        phone: &Phone,
        except: Option<UserId>,
    ) -> Result<bool, UserRepositoryError> {
        Ok(self.lock()?.values().any(|stored| {
            &stored.user.phone == phone && except.is_none_or(|id| id != stored.user.id)
        }))
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        if let Some(field) = conflicting_field(&users, user) {
            return Err(UserRepositoryError::duplicate(field));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| UserRepositoryError::query("user not found for update"))?;
        stored.user = user.clone();
        Ok(())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut users: Vec<User> = self
            .lock()?
            .values()
            .filter(|stored| stored.user.role == role)
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(users)
    }
}
