//! Server settings and the assembled configuration handed to
//! [`super::create_server`].

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use storyscape::domain::DEFAULT_MAX_IMAGE_BYTES;
use storyscape::inbound::http::session_config::SessionSettings;
use storyscape::outbound::images::CloudinaryCredentials;
use storyscape::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings read from `STORYSCAPE_*` variables, config files and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STORYSCAPE")]
pub struct ServerSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Upper bound for uploaded photos and cover images, in bytes.
    pub max_image_bytes: Option<usize>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Folder prefix for uploaded images.
    pub cloudinary_folder: Option<String>,
}

/// Settings that cannot be turned into a runnable server.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("max image size must be greater than zero")]
    ZeroImageLimit,
    #[error("incomplete Cloudinary settings; missing {missing}")]
    PartialCloudinary { missing: &'static str },
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = present(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        present(self.database_url.as_ref())
    }

    pub fn max_image_bytes(&self) -> Result<usize, SettingsError> {
        match self.max_image_bytes {
            Some(0) => Err(SettingsError::ZeroImageLimit),
            Some(limit) => Ok(limit),
            None => Ok(DEFAULT_MAX_IMAGE_BYTES),
        }
    }

    /// Cloudinary credentials when all three are set, `None` when none are.
    pub fn cloudinary(&self) -> Result<Option<CloudinaryCredentials>, SettingsError> {
        let cloud = present(self.cloudinary_cloud_name.as_ref());
        let key = present(self.cloudinary_api_key.as_ref());
        let secret = present(self.cloudinary_api_secret.as_ref());
        match (cloud, key, secret) {
            (None, None, None) => Ok(None),
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                Ok(Some(CloudinaryCredentials {
                    cloud_name: cloud_name.to_owned(),
                    api_key: api_key.to_owned(),
                    api_secret: Zeroizing::new(api_secret.to_owned()),
                    folder: present(self.cloudinary_folder.as_ref()).map(str::to_owned),
                }))
            }
            (None, _, _) => Err(SettingsError::PartialCloudinary {
                missing: "cloudinary_cloud_name",
            }),
            (_, None, _) => Err(SettingsError::PartialCloudinary {
                missing: "cloudinary_api_key",
            }),
            (_, _, None) => Err(SettingsError::PartialCloudinary {
                missing: "cloudinary_api_secret",
            }),
        }
    }
}

/// Everything [`super::create_server`] needs.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) max_image_bytes: usize,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) cloudinary: Option<CloudinaryCredentials>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            db_pool: None,
            cloudinary: None,
        }
    }

    /// Use PostgreSQL-backed repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Upload images to Cloudinary instead of keeping them in memory.
    #[must_use]
    pub fn with_cloudinary(mut self, credentials: Option<CloudinaryCredentials>) -> Self {
        self.cloudinary = credentials;
        self
    }

    #[must_use]
    pub fn with_max_image_bytes(mut self, limit: usize) -> Self {
        self.max_image_bytes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 7] = [
        "STORYSCAPE_BIND_ADDR",
        "STORYSCAPE_DATABASE_URL",
        "STORYSCAPE_MAX_IMAGE_BYTES",
        "STORYSCAPE_CLOUDINARY_CLOUD_NAME",
        "STORYSCAPE_CLOUDINARY_API_KEY",
        "STORYSCAPE_CLOUDINARY_API_SECRET",
        "STORYSCAPE_CLOUDINARY_FOLDER",
    ];

    fn load_with(vars: &[(&str, &str)]) -> ServerSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = vars
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        ServerSettings::load_from_iter([OsString::from("storyscape")]).expect("settings load")
    }

    #[rstest]
    fn defaults_apply_without_configuration() {
        let settings = load_with(&[]);
        assert_eq!(
            settings.bind_addr(),
            Ok(DEFAULT_BIND_ADDR.parse().expect("valid default"))
        );
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.max_image_bytes(), Ok(DEFAULT_MAX_IMAGE_BYTES));
        assert!(settings.cloudinary().expect("no cloudinary").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("STORYSCAPE_BIND_ADDR", "127.0.0.1:9000"),
            ("STORYSCAPE_DATABASE_URL", "postgres://db/storyscape"),
            ("STORYSCAPE_MAX_IMAGE_BYTES", "1024"),
            ("STORYSCAPE_CLOUDINARY_CLOUD_NAME", "demo"),
            ("STORYSCAPE_CLOUDINARY_API_KEY", "123"),
            ("STORYSCAPE_CLOUDINARY_API_SECRET", "shh"),
            ("STORYSCAPE_CLOUDINARY_FOLDER", "storyscape"),
        ]);
        assert_eq!(
            settings.bind_addr(),
            Ok("127.0.0.1:9000".parse().expect("valid addr"))
        );
        assert_eq!(settings.database_url(), Some("postgres://db/storyscape"));
        assert_eq!(settings.max_image_bytes(), Ok(1024));
        let credentials = settings
            .cloudinary()
            .expect("complete settings")
            .expect("credentials");
        assert_eq!(credentials.cloud_name, "demo");
        assert_eq!(credentials.api_secret.as_str(), "shh");
        assert_eq!(credentials.folder.as_deref(), Some("storyscape"));
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = load_with(&[("STORYSCAPE_DATABASE_URL", "  ")]);
        assert_eq!(settings.database_url(), None);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let settings = load_with(&[("STORYSCAPE_BIND_ADDR", "localhost")]);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { value, .. }) if value == "localhost"
        ));
    }

    #[rstest]
    fn zero_image_limit_is_rejected() {
        let settings = load_with(&[("STORYSCAPE_MAX_IMAGE_BYTES", "0")]);
        assert_eq!(settings.max_image_bytes(), Err(SettingsError::ZeroImageLimit));
    }

    #[rstest]
    #[case(&[("STORYSCAPE_CLOUDINARY_CLOUD_NAME", "demo")], "cloudinary_api_key")]
    #[case(&[("STORYSCAPE_CLOUDINARY_API_KEY", "1"), ("STORYSCAPE_CLOUDINARY_API_SECRET", "s")], "cloudinary_cloud_name")]
    #[case(&[("STORYSCAPE_CLOUDINARY_CLOUD_NAME", "demo"), ("STORYSCAPE_CLOUDINARY_API_KEY", "1")], "cloudinary_api_secret")]
    fn partial_cloudinary_settings_are_rejected(
        #[case] vars: &[(&str, &str)],
        #[case] missing: &str,
    ) {
        let settings = load_with(vars);
        assert!(matches!(
            settings.cloudinary(),
            Err(SettingsError::PartialCloudinary { missing: name }) if name == missing
        ));
    }
}
