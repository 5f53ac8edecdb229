use std::path::Path;

use anyhow::{anyhow, bail, Context};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use soundboard_types::{
    ApiResponse, AudioFormat, DeleteRequest, LoginRequest, MessageData, SoundboardConfig,
    UploadReport, VerifyData, ADMIN_PASSWORD_HEADER, SESSION_COOKIE,
};
use tracing::debug;
use zeroize::Zeroizing;

/// How requests prove admin rights.
pub enum Credential {
    /// Token from a previous `login`
    Session(String),
    /// The admin secret itself, sent on every request
    Password(Zeroizing<String>),
}

/// HTTP client for the soundboard admin API.
pub struct SoundboardClient {
    pub base_url: String,
    http: reqwest::Client,
    credential: Option<Credential>,
}

impl SoundboardClient {
    pub fn new(base_url: &str, credential: Option<Credential>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            credential,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(Credential::Session(token)) => {
                request.header(COOKIE, format!("{}={}", SESSION_COOKIE, token))
            }
            Some(Credential::Password(secret)) => {
                request.header(ADMIN_PASSWORD_HEADER, secret.as_str())
            }
            None => request,
        }
    }

    /// Log in and return the session token the server set.
    pub async fn login(&self, password: &str) -> anyhow::Result<String> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest {
                password: Some(password.to_string()),
            })
            .send()
            .await?;

        let token = session_token(&resp);
        let _: MessageData = into_data(resp).await?;
        token.ok_or_else(|| anyhow!("server accepted the login but set no session cookie"))
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        let resp = self
            .authorize(self.http.post(self.url("/api/auth/logout")))
            .send()
            .await?;
        let _: MessageData = into_data(resp).await?;
        Ok(())
    }

    /// Whether the current credential is accepted.
    pub async fn verify(&self) -> anyhow::Result<bool> {
        let resp = self
            .authorize(self.http.get(self.url("/api/auth/verify")))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let data: VerifyData = into_data(resp).await?;
        Ok(data.authenticated)
    }

    pub async fn get_config(&self) -> anyhow::Result<SoundboardConfig> {
        let resp = self.http.get(self.url("/api/config")).send().await?;
        into_data(resp).await
    }

    pub async fn put_config(&self, config: &SoundboardConfig) -> anyhow::Result<String> {
        let resp = self
            .authorize(self.http.post(self.url("/api/config")))
            .json(config)
            .send()
            .await?;
        let data: MessageData = into_data(resp).await?;
        Ok(data.message)
    }

    pub async fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let resp = self
            .authorize(self.http.get(self.url("/api/audio-files")))
            .send()
            .await?;
        into_data(resp).await
    }

    pub async fn delete_file(&self, filename: &str) -> anyhow::Result<String> {
        let resp = self
            .authorize(self.http.delete(self.url("/api/audio-files")))
            .json(&DeleteRequest {
                filename: Some(filename.to_string()),
            })
            .send()
            .await?;
        let data: MessageData = into_data(resp).await?;
        Ok(data.message)
    }

    /// Upload local files in one batch.
    ///
    /// The report comes back even when every file was rejected.
    pub async fn upload(&self, paths: &[impl AsRef<Path>]) -> anyhow::Result<UploadReport> {
        let mut form = Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
            let media_type = declared_media_type(&name);
            debug!(file = %name, media_type, bytes = bytes.len(), "Adding upload part");

            let part = Part::bytes(bytes).file_name(name).mime_str(media_type)?;
            form = form.part("files", part);
        }

        let resp = self
            .authorize(self.http.post(self.url("/api/upload")))
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body: ApiResponse<UploadReport> = resp
            .json()
            .await
            .with_context(|| format!("unexpected response ({})", status))?;

        match (body.data, body.error) {
            (Some(report), _) => Ok(report),
            (None, Some(err)) => bail!("{}", err),
            (None, None) => bail!("empty response ({})", status),
        }
    }
}

/// Media type to declare for a local file, judged by its extension.
pub fn declared_media_type(name: &str) -> &'static str {
    AudioFormat::from_filename(name)
        .map(AudioFormat::media_type)
        .unwrap_or("application/octet-stream")
}

/// Pull the session token out of the login response's `Set-Cookie` headers.
fn session_token(resp: &Response) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find_map(|pair| pair.trim().strip_prefix(&prefix).map(str::to_string))
        .filter(|token| !token.is_empty())
}

/// Unwrap the response envelope, turning failures into errors.
async fn into_data<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let status = resp.status();
    let body: ApiResponse<T> = resp
        .json()
        .await
        .with_context(|| format!("unexpected response ({})", status))?;

    if let Some(err) = body.error {
        bail!("{}", err);
    }
    if !body.success {
        bail!("request failed ({})", status);
    }
    body.data
        .ok_or_else(|| anyhow!("response carried no data ({})", status))
}
