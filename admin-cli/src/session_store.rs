use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Session token saved by `login`, tied to the server it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub server_url: String,
    pub token: String,
}

pub struct SessionStore {
    session_path: PathBuf,
}

impl SessionStore {
    pub fn new() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not find config directory"))?
            .join("soundboard");

        fs::create_dir_all(&config_dir)?;

        Ok(Self {
            session_path: config_dir.join("session.json"),
        })
    }

    /// The saved session for `server_url`, if any.
    ///
    /// A session saved for a different server is ignored.
    pub fn load(&self, server_url: &str) -> anyhow::Result<Option<StoredSession>> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.session_path)?;
        let session: StoredSession = serde_json::from_str(&data)?;
        if session.server_url != server_url {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(session)?;
        let mut file = open_private(&self.session_path)?;
        // A file left by an older version keeps its mode on open
        restrict_permissions(&self.session_path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Forget the saved session. Returns whether one existed.
    pub fn clear(&self) -> anyhow::Result<bool> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.session_path
    }
}

/// Open for writing, creating the file readable by its owner only.
fn open_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
