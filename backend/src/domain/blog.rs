//! Blog post data model.
//!
//! A [`Blog`] is authored by exactly one creator and carries a cover image.
//! Read models ([`BlogView`]) embed the author card and, for signed-in
//! viewers, whether they liked or saved the post.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{About, AuthorSummary, ImageRef, ImageUpload, Role, UserId};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 120;
pub const CATEGORY_MIN: usize = 2;
pub const CATEGORY_MAX: usize = 40;
pub const BODY_MAX: usize = 100_000;

/// Validation errors for blog fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlogValidationError {
    #[error("blog id must be a valid UUID")]
    InvalidId,
    #[error("title must be between {min} and {max} characters")]
    TitleLength { min: usize, max: usize },
    #[error(
        "category must be {min} to {max} letters, digits, spaces, '-' or '&'"
    )]
    InvalidCategory { min: usize, max: usize },
    #[error("body must not be empty")]
    EmptyBody,
    #[error("body must be at most {max} characters")]
    BodyTooLong { max: usize },
}

impl BlogValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::TitleLength { .. } => "title",
            Self::InvalidCategory { .. } => "category",
            Self::EmptyBody | Self::BodyTooLong { .. } => "body",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::TitleLength { .. } => "invalid_title",
            Self::InvalidCategory { .. } => "invalid_category",
            Self::EmptyBody => "empty_body",
            Self::BodyTooLong { .. } => "body_too_long",
        }
    }
}

/// Blog identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlogId(Uuid);

impl BlogId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, BlogValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| BlogValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<BlogId> for String {
    fn from(value: BlogId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for BlogId {
    type Error = BlogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

macro_rules! blog_text {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BlogValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

blog_text! {
    /// Headline shown on feed cards.
    BlogTitle
}

impl BlogTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, BlogValidationError> {
        let title = title.into();
        let trimmed = title.trim();
        if !(TITLE_MIN..=TITLE_MAX).contains(&trimmed.chars().count()) {
            return Err(BlogValidationError::TitleLength {
                min: TITLE_MIN,
                max: TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

static CATEGORY_RE: OnceLock<Regex> = OnceLock::new();

fn category_regex() -> &'static Regex {
    CATEGORY_RE.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N} &-]+$")
            .unwrap_or_else(|error| panic!("category regex failed to compile: {error}"))
    })
}

blog_text! {
    /// Topic label used to group and filter posts.
    ///
    /// Stored as entered (trimmed, inner whitespace collapsed); compare with
    /// [`Category::matches`] for case-insensitive equality.
    Category
}

impl Category {
    pub fn new(category: impl Into<String>) -> Result<Self, BlogValidationError> {
        let category = category.into();
        let collapsed = category.split_whitespace().collect::<Vec<_>>().join(" ");
        let length = collapsed.chars().count();
        if !(CATEGORY_MIN..=CATEGORY_MAX).contains(&length)
            || !category_regex().is_match(&collapsed)
        {
            return Err(BlogValidationError::InvalidCategory {
                min: CATEGORY_MIN,
                max: CATEGORY_MAX,
            });
        }
        Ok(Self(collapsed))
    }

    /// Lowercased form used for grouping.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn matches(&self, other: &Category) -> bool {
        self.key() == other.key()
    }
}

blog_text! {
    /// Rich-text body as produced by the editor. Stored verbatim.
    BlogBody
}

impl BlogBody {
    pub fn new(body: impl Into<String>) -> Result<Self, BlogValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(BlogValidationError::EmptyBody);
        }
        if body.chars().count() > BODY_MAX {
            return Err(BlogValidationError::BodyTooLong { max: BODY_MAX });
        }
        Ok(Self(body))
    }
}

/// Stored blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: BlogId,
    pub title: BlogTitle,
    pub category: Category,
    pub body: BlogBody,
    pub author: UserId,
    pub image: ImageRef,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    #[schema(value_type = String, example = "0d9c2ae1-6a0e-4d49-9d53-3d1c9c4b0f52")]
    pub id: BlogId,
    #[schema(value_type = String, example = "Sourdough at altitude")]
    pub title: BlogTitle,
    #[schema(value_type = String, example = "Food & Drink")]
    pub category: Category,
    #[schema(value_type = String)]
    pub body: BlogBody,
    pub image: ImageRef,
    pub author: AuthorSummary,
    pub like_count: u64,
    /// Present when the request carries a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    /// Present when the request carries a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogView {
    pub fn new(blog: Blog, author: AuthorSummary) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            category: blog.category,
            body: blog.body,
            image: blog.image,
            author,
            like_count: blog.like_count,
            liked: None,
            saved: None,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }

    pub fn with_viewer_state(mut self, liked: bool, saved: bool) -> Self {
        self.liked = Some(liked);
        self.saved = Some(saved);
        self
    }
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone)]
pub struct BlogDraft {
    pub title: BlogTitle,
    pub category: Category,
    pub body: BlogBody,
    pub image: ImageUpload,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<BlogTitle>,
    pub category: Option<Category>,
    pub body: Option<BlogBody>,
    pub image: Option<ImageUpload>,
}

impl BlogChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none() && self.body.is_none() && self.image.is_none()
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: u64,
}

/// Result of toggling a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub saved: bool,
}

/// Number of posts in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    #[schema(example = "Travel")]
    pub category: String,
    pub count: u64,
}

/// Creator dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_blogs: u64,
    pub total_likes: u64,
    pub blogs: Vec<BlogView>,
}

/// Public author page.
///
/// Contact details (email, phone) are not exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub author: AuthorSummary,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub about: Option<About>,
    pub total_likes: u64,
    pub blogs: Vec<BlogView>,
}
