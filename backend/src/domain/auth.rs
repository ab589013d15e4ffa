//! Authentication and account form primitives.
//!
//! Inbound adapters parse raw strings into these types before calling a
//! driving port, so services only ever see validated input.

use std::fmt;

use zeroize::Zeroizing;

use super::{About, Email, ImageUpload, Phone, Role, UserId, UserName, UserValidationError};

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    #[error(transparent)]
    Field(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

impl CredentialsValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Field(inner) => inner.field(),
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Field(inner) => inner.code(),
            Self::EmptyPassword => "empty_password",
            Self::PasswordLength { .. } => "invalid_password",
        }
    }
}

/// Plain-text password held in zeroizing memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a password for a new account, enforcing the length policy.
    ///
    /// Whitespace is kept as typed.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialsValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is a normalised [`Email`].
/// - `password` is non-empty; no length policy applies at login so older
///   accounts are not locked out.
///
/// # Examples
/// ```
/// use storyscape::domain::{LoginCredentials, Role};
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "hunter22", Some("creator")).unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.role(), Some(Role::Creator));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
    role: Option<Role>,
}

impl LoginCredentials {
    pub fn try_from_parts(
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let role = role
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<Role>)
            .transpose()?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role the client expects to sign in as, if it said.
    pub fn role(&self) -> Option<Role> {
        self.role
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Identity stored in the session cookie after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub role: Role,
}

/// Validated sign-up form.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub name: UserName,
    pub email: Email,
    pub phone: Phone,
    pub password: Password,
    pub role: Role,
    pub photo: ImageUpload,
}

/// Profile edits; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<UserName>,
    pub phone: Option<Phone>,
    pub about: Option<About>,
    pub photo: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not-an-email", "pw", None, "email")]
    #[case("ada@example.com", "", None, "password")]
    #[case("ada@example.com", "pw", Some("admin"), "role")]
    fn invalid_login_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] role: Option<&str>,
        #[case] field: &str,
    ) {
        let err = LoginCredentials::try_from_parts(email, password, role)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("Reader"), Some(Role::Reader))]
    fn role_is_optional(#[case] raw: Option<&str>, #[case] expected: Option<Role>) {
        let creds = LoginCredentials::try_from_parts("a@b.io", " secret ", raw).expect("valid");
        assert_eq!(creds.role(), expected);
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case("short", false)]
    #[case("eight ch", true)]
    fn password_policy(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Password::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let creds = LoginCredentials::try_from_parts("a@b.io", "topsecret", None).expect("valid");
        let password = Password::new("topsecret").expect("valid");
        assert!(!format!("{creds:?}").contains("topsecret"));
        assert!(!format!("{password:?}").contains("topsecret"));
    }
}
