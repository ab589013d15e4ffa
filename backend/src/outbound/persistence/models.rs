//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{blog_likes, blogs, saved_blogs, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub photo_public_id: String,
    pub photo_url: String,
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Login material projection.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub role: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub photo_public_id: &'a str,
    pub photo_url: &'a str,
    pub about: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile changeset; `about = None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub photo_public_id: &'a str,
    pub photo_url: &'a str,
    pub about: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = blogs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BlogRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub category: String,
    pub body: String,
    pub image_public_id: String,
    pub image_url: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blogs)]
pub(crate) struct NewBlogRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: &'a str,
    pub category: &'a str,
    pub body: &'a str,
    pub image_public_id: &'a str,
    pub image_url: &'a str,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable blog columns. `like_count` is owned by the like toggle.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = blogs)]
pub(crate) struct BlogContentUpdate<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub body: &'a str,
    pub image_public_id: &'a str,
    pub image_url: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blog_likes)]
pub(crate) struct NewBlogLikeRow {
    pub blog_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = saved_blogs)]
pub(crate) struct NewSavedBlogRow {
    pub user_id: Uuid,
    pub blog_id: Uuid,
}
