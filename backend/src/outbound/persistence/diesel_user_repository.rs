//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    About, Email, ImageRef, Phone, Role, User, UserCredentials, UserId, UserName,
};

use super::error_mapping::{DbFailure, classify_diesel_error, classify_pool_error};
use super::models::{CredentialsRow, NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_port_error(failure: DbFailure) -> UserRepositoryError {
    match failure {
        DbFailure::Connection(message) => UserRepositoryError::connection(message),
        DbFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some("users_email_key") => UserRepositoryError::duplicate("email"),
            Some("users_phone_key") => UserRepositoryError::duplicate("phone"),
            other => {
                warn!(constraint = ?other, "unexpected unique violation on users");
                UserRepositoryError::query("unique constraint violated")
            }
        },
        DbFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    into_port_error(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    into_port_error(classify_diesel_error(error))
}

/// Rebuild a domain user, rejecting rows that no longer satisfy validation.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let corrupt = |err: crate::domain::UserValidationError| {
        warn!(user_id = %row.id, %err, "stored user row failed validation");
        UserRepositoryError::query(format!("invalid stored user: {err}"))
    };
    Ok(User {
        id: UserId::from_uuid(row.id),
        name: UserName::new(row.name.as_str()).map_err(corrupt)?,
        email: Email::new(row.email.as_str()).map_err(corrupt)?,
        phone: Phone::new(row.phone.as_str()).map_err(corrupt)?,
        role: row.role.parse::<Role>().map_err(corrupt)?,
        photo: ImageRef::new(row.photo_public_id.as_str(), row.photo_url.as_str()),
        about: row.about.as_deref().map(About::new).transpose().map_err(corrupt)?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            phone: user.phone.as_ref(),
            role: user.role.as_str(),
            password_hash,
            photo_public_id: user.photo.public_id.as_str(),
            photo_url: user.photo.url.as_str(),
            about: user.about.as_ref().map(AsRef::as_ref),
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialsRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            let role = row
                .role
                .parse::<Role>()
                .map_err(|err| UserRepositoryError::query(format!("invalid stored role: {err}")))?;
            Ok(UserCredentials {
                user_id: UserId::from_uuid(row.id),
                role,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn email_taken(&self, email: &Email) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn phone_taken(
        &self,
        phone: &Phone,
        except: Option<UserId>,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut holders = users::table
            .select(users::id)
            .filter(users::phone.eq(phone.as_ref().to_owned()))
            .into_boxed();
        if let Some(except) = except {
            holders = holders.filter(users::id.ne(*except.as_uuid()));
        }
        let found: Option<uuid::Uuid> = holders
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserProfileUpdate {
            name: user.name.as_ref(),
            phone: user.phone.as_ref(),
            photo_public_id: user.photo.public_id.as_str(),
            photo_url: user.photo.url.as_str(),
            about: user.about.as_ref().map(AsRef::as_ref),
            updated_at: Utc::now(),
        };
        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::query("user not found for update"));
        }
        Ok(())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .order_by(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}
