//! User data model.
//!
//! A user is either a `reader` or a `creator`; only creators author blogs.
//! Email and phone are unique across accounts and stored normalised.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ImageRef;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("phone must contain {min} to {max} digits")]
    InvalidPhone { min: usize, max: usize },
    #[error("role must be one of: reader, creator")]
    UnknownRole,
    #[error("about must be at most {max} characters")]
    AboutTooLong { max: usize },
}

impl UserValidationError {
    /// Form field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::NameLength { .. } => "name",
            Self::InvalidEmail => "email",
            Self::InvalidPhone { .. } => "phone",
            Self::UnknownRole => "role",
            Self::AboutTooLong { .. } => "about",
        }
    }

    /// Machine-readable code used in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId => "empty_id",
            Self::InvalidId => "invalid_id",
            Self::NameLength { .. } => "invalid_name",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone { .. } => "invalid_phone",
            Self::UnknownRole => "invalid_role",
            Self::AboutTooLong { .. } => "about_too_long",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

macro_rules! string_newtype {
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
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;
pub const PHONE_MIN_DIGITS: usize = 7;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const ABOUT_MAX: usize = 500;

string_newtype! {
    /// Display name shown on author profiles; trimmed.
    UserName
}

impl UserName {
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        let length = trimmed.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&length) {
            return Err(UserValidationError::NameLength {
                min: NAME_MIN,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

string_newtype! {
    /// Login identifier; trimmed and lowercased.
    Email
}

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let normalised = email.trim().to_lowercase();
        if normalised.len() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

string_newtype! {
    /// Contact number stored as `+` followed by digits only.
    Phone
}

impl Phone {
    /// Strip spaces, dashes, dots and parentheses, then check the digits.
    ///
    /// The leading `+` is optional on input and always present when stored,
    /// so `15550102030` and `+1 555 010 2030` are the same number for
    /// uniqueness checks.
    ///
    /// # Examples
    /// ```
    /// use storyscape::domain::Phone;
    ///
    /// let phone = Phone::new("+1 (555) 010-2030").unwrap();
    /// assert_eq!(phone.as_ref(), "+15550102030");
    /// assert_eq!(Phone::new("15550102030").unwrap(), phone);
    /// ```
    pub fn new(phone: impl Into<String>) -> Result<Self, UserValidationError> {
        let phone = phone.into();
        let invalid = UserValidationError::InvalidPhone {
            min: PHONE_MIN_DIGITS,
            max: PHONE_MAX_DIGITS,
        };
        let compact: String = phone
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        if !digits.chars().all(|c| c.is_ascii_digit())
            || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len())
        {
            return Err(invalid);
        }
        Ok(Self(format!("+{digits}")))
    }
}

string_newtype! {
    /// Short author biography.
    About
}

impl About {
    pub fn new(about: impl Into<String>) -> Result<Self, UserValidationError> {
        let about = about.into();
        let trimmed = about.trim();
        if trimmed.chars().count() > ABOUT_MAX {
            return Err(UserValidationError::AboutTooLong { max: ABOUT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Account role. Creators may author blogs; readers may like and save them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Creator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Creator => "creator",
        }
    }

    pub fn can_author(self) -> bool {
        matches!(self, Self::Creator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "creator" => Ok(Self::Creator),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - All fields are validated newtypes; the password hash never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub name: UserName,
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Email,
    #[schema(value_type = String, example = "+15550102030")]
    pub phone: Phone,
    pub role: Role,
    pub photo: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub about: Option<About>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public card embedded in blog payloads.
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.name.clone(),
            photo: self.photo.clone(),
        }
    }
}

/// Author fields shown alongside a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    #[schema(value_type = String)]
    pub id: UserId,
    #[schema(value_type = String)]
    pub name: UserName,
    pub photo: ImageRef,
}

/// Stored login material for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub role: Role,
    pub password_hash: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
