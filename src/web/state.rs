use crate::admin::{CredentialValidator, RequestAuthenticator, SessionCookies, SessionIssuer};
use crate::config::{AppConfig, StartupError};
use crate::storage::{AssetCatalog, ConfigStore, StorageLayout, UploadPipeline};
use axum::extract::FromRef;
use std::sync::Arc;

/// Shared state for every route. Handlers pull the part they need through
/// `State<...>`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth: Arc<RequestAuthenticator>,
    pub cookies: SessionCookies,
    pub store: Arc<ConfigStore>,
    pub catalog: Arc<AssetCatalog>,
    pub uploads: Arc<UploadPipeline>,
}

impl AppState {
    /// Build the state from validated settings.
    pub fn from_config(config: &AppConfig, layout: &StorageLayout) -> Result<Self, StartupError> {
        config.validate()?;
        let signing_secret = config.signing_secret()?;

        let auth = RequestAuthenticator::new(
            CredentialValidator::new(config.admin.password.as_deref()),
            SessionIssuer::new(
                signing_secret,
                chrono::Duration::hours(config.session.lifetime_hours),
            ),
            config.session.cookie_name.clone(),
        );

        Ok(Self {
            auth: Arc::new(auth),
            cookies: SessionCookies {
                secure: config.session.secure_cookie,
            },
            store: Arc::new(ConfigStore::new(
                layout.config_path.clone(),
                layout.backup_path.clone(),
            )),
            catalog: Arc::new(AssetCatalog::new(layout.audio_dir.clone())),
            uploads: Arc::new(UploadPipeline::new(
                layout.audio_dir.clone(),
                config.upload.max_file_size,
            )),
        })
    }
}
