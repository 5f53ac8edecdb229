use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Signing key the service refuses to run with. It was shipped as a fallback
/// by earlier deployments and must be treated as public.
pub const PUBLIC_DEFAULT_SIGNING_SECRET: &str = "default-secret-key";

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for every path the API does not claim
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Body limit for the upload route (the whole multipart request)
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_request_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

/// Administrator credential
#[derive(Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// The single shared admin secret. Unset means every login is refused.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Session token settings
#[derive(Deserialize, Clone)]
pub struct SessionConfig {
    /// HMAC key for session tokens. Required at startup.
    #[serde(default)]
    pub signing_secret: Option<String>,
    #[serde(default = "default_lifetime_hours")]
    pub lifetime_hours: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the cookie `Secure`; turn off only for plain-HTTP development.
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
}

fn default_lifetime_hours() -> i64 {
    24
}

fn default_cookie_name() -> String {
    soundboard_types::SESSION_COOKIE.to_string()
}

fn default_secure_cookie() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            lifetime_hours: default_lifetime_hours(),
            cookie_name: default_cookie_name(),
            secure_cookie: default_secure_cookie(),
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("lifetime_hours", &self.lifetime_hours)
            .field("cookie_name", &self.cookie_name)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

/// On-disk locations
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Managed data directory holding the configuration document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_config_file")]
    pub config_file: String,
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
    /// Pre-data-dir location of the document, migrated once on first run
    #[serde(default = "default_legacy_config_path")]
    pub legacy_config_path: PathBuf,
    /// Managed audio directory
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_config_file() -> String {
    "sounds.yaml".to_string()
}

fn default_backup_suffix() -> String {
    ".bak".to_string()
}

fn default_legacy_config_path() -> PathBuf {
    PathBuf::from("sounds.yaml")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("public").join("audio")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            config_file: default_config_file(),
            backup_suffix: default_backup_suffix(),
            legacy_config_path: default_legacy_config_path(),
            audio_dir: default_audio_dir(),
        }
    }
}

impl StorageConfig {
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(&self.config_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}{}", self.config_file, self.backup_suffix))
    }
}

/// Upload limits
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Per-file byte limit
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    2 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that parse but cannot be run with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("session signing secret is not configured (set SOUNDBOARD_SESSION__SIGNING_SECRET or JWT_SECRET)")]
    MissingSigningSecret,

    #[error("session signing secret is the public default; choose a private value")]
    PublicDefaultSigningSecret,

    #[error("session lifetime must be positive, got {0}h")]
    InvalidSessionLifetime(i64),

    #[error("upload size limit must be positive")]
    InvalidUploadLimit,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: SOUNDBOARD_)
            // e.g., SOUNDBOARD_ADMIN__PASSWORD, SOUNDBOARD_UPLOAD__MAX_FILE_SIZE
            .add_source(
                Environment::with_prefix("SOUNDBOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            // Flat variable names older deployments were configured with
            .set_override_option("admin.password", std::env::var("ADMIN_PASSWORD").ok())?
            .set_override_option(
                "session.signing_secret",
                std::env::var("JWT_SECRET").ok(),
            )?
            .set_override_option("upload.max_file_size", std::env::var("MAX_FILE_SIZE").ok())?;

        Self::from_config(builder.build()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    /// Check the settings the service cannot safely start without.
    pub fn validate(&self) -> Result<(), StartupError> {
        self.signing_secret()?;
        if self.session.lifetime_hours <= 0 {
            return Err(StartupError::InvalidSessionLifetime(
                self.session.lifetime_hours,
            ));
        }
        if self.upload.max_file_size == 0 {
            return Err(StartupError::InvalidUploadLimit);
        }
        Ok(())
    }

    /// The configured signing secret, refusing unset, empty and public values.
    pub fn signing_secret(&self) -> Result<&str, StartupError> {
        match self.session.signing_secret.as_deref() {
            None => Err(StartupError::MissingSigningSecret),
            Some(s) if s.trim().is_empty() => Err(StartupError::MissingSigningSecret),
            Some(PUBLIC_DEFAULT_SIGNING_SECRET) => Err(StartupError::PublicDefaultSigningSecret),
            Some(s) => Ok(s),
        }
    }

    /// Whether an admin password is configured at all.
    pub fn admin_login_enabled(&self) -> bool {
        self.admin
            .password
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> AppConfig {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        AppConfig::from_config(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.upload.max_file_size, 2_097_152);
        assert_eq!(config.session.lifetime_hours, 24);
        assert_eq!(config.session.cookie_name, "admin-session");
        assert!(config.session.secure_cookie);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.storage.config_path(), PathBuf::from("data/sounds.yaml"));
        assert_eq!(
            config.storage.backup_path(),
            PathBuf::from("data/sounds.yaml.bak")
        );
        assert_eq!(config.storage.audio_dir, PathBuf::from("public/audio"));
    }

    #[test]
    fn test_missing_signing_secret_refused() {
        let config = config_with(&[]);
        assert_eq!(config.validate(), Err(StartupError::MissingSigningSecret));

        let config = config_with(&[("session.signing_secret", "   ")]);
        assert_eq!(config.validate(), Err(StartupError::MissingSigningSecret));
    }

    #[test]
    fn test_public_default_signing_secret_refused() {
        let config = config_with(&[("session.signing_secret", PUBLIC_DEFAULT_SIGNING_SECRET)]);
        assert_eq!(
            config.validate(),
            Err(StartupError::PublicDefaultSigningSecret)
        );
    }

    #[test]
    fn test_valid_configuration() {
        let config = config_with(&[
            ("session.signing_secret", "a-private-signing-key"),
            ("admin.password", "hunter2"),
            ("upload.max_file_size", "1024"),
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.signing_secret().unwrap(), "a-private-signing-key");
        assert_eq!(config.upload.max_file_size, 1024);
        assert!(config.admin_login_enabled());
    }

    #[test]
    fn test_invalid_lifetime_refused() {
        let config = config_with(&[
            ("session.signing_secret", "k"),
            ("session.lifetime_hours", "0"),
        ]);
        assert_eq!(
            config.validate(),
            Err(StartupError::InvalidSessionLifetime(0))
        );
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let config = config_with(&[
            ("session.signing_secret", "super-secret-key"),
            ("admin.password", "hunter2"),
        ]);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_empty_password_disables_login() {
        let config = config_with(&[("admin.password", "")]);
        assert!(!config.admin_login_enabled());
    }
}
