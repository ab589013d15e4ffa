//! Session cookie settings read from `SESSION_*` environment variables.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds require every toggle to be set and valid, and refuse short or
//! ephemeral keys.
//!
//! | Variable | Values | Debug default |
//! |---|---|---|
//! | `SESSION_KEY_FILE` | path | `/var/run/secrets/session_key` |
//! | `SESSION_COOKIE_SECURE` | bool | `true` |
//! | `SESSION_SAMESITE` | `Strict`, `Lax`, `None` | `Lax` |
//! | `SESSION_ALLOW_EPHEMERAL` | bool | `false` |

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
const MIN_KEY_LEN: usize = 64;
// `Key::derive_from` panics below this.
const DERIVE_MIN_LEN: usize = 32;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Strictness applied while validating settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode matching the current compilation profile.
    ///
    /// ```rust
    /// use storyscape::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) { BuildMode::Debug } else { BuildMode::Release };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Why the session settings were refused.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session settings.
///
/// # Errors
///
/// In release mode any missing or malformed toggle is an error, as is an
/// unreadable or short key file. Debug mode only fails on conditions it
/// cannot default around.
pub fn session_settings_from_env<E: Env + ?Sized>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = toggle(env, mode, COOKIE_SECURE_ENV, parse_bool, true, BOOL_EXPECTED)?;

    let same_site = toggle(
        env,
        mode,
        SAMESITE_ENV,
        parse_same_site,
        SameSite::Lax,
        SAMESITE_EXPECTED,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        match mode {
            BuildMode::Release => return Err(SessionConfigError::InsecureSameSiteNone),
            BuildMode::Debug => {
                warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
            }
        }
    }

    let allow_ephemeral = toggle(env, mode, ALLOW_EPHEMERAL_ENV, parse_bool, false, BOOL_EXPECTED)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    let key = load_key(env, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Read one variable; debug mode swaps problems for `fallback`.
fn toggle<E, T>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    parse: fn(&str) -> Option<T>,
    fallback: T,
    expected: &'static str,
) -> Result<T, SessionConfigError>
where
    E: Env + ?Sized,
{
    let error = match env.string(name) {
        Some(value) => match parse(&value) {
            Some(parsed) => return Ok(parsed),
            None => SessionConfigError::InvalidEnv {
                name,
                value,
                expected,
            },
        },
        None => SessionConfigError::MissingEnv { name },
    };
    match mode {
        BuildMode::Release => Err(error),
        BuildMode::Debug => {
            warn!(%error, "using default session setting");
            Ok(fallback)
        }
    }
}

fn load_key<E: Env + ?Sized>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    let min_len = match mode {
        BuildMode::Debug => DERIVE_MIN_LEN,
        BuildMode::Release => MIN_KEY_LEN,
    };
    match std::fs::read(&path).map(Zeroizing::new) {
        Ok(bytes) if bytes.len() < min_len => Err(SessionConfigError::KeyTooShort {
            path,
            length: bytes.len(),
            min_len,
        }),
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
