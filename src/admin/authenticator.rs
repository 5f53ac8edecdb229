//! Resolves an inbound request to an admin session.
//!
//! Two credential shapes are accepted, tried in this order:
//! 1. the signed session cookie,
//! 2. the legacy `x-admin-password` header holding the admin secret itself.
//!
//! The header path does no cryptographic work; whoever holds the admin
//! secret can use it on every request.

use crate::admin::credentials::CredentialValidator;
use crate::admin::session::{SessionData, SessionIssuer};
use crate::error::AppError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use soundboard_types::ADMIN_PASSWORD_HEADER;
use std::sync::Arc;
use tracing::{debug, warn};

/// A credential found on a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Value of the session cookie
    CookieToken(String),
    /// Value of the legacy shared-secret header
    HeaderSecret(String),
}

impl Credential {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::CookieToken(_) => CredentialKind::Cookie,
            Credential::HeaderSecret(_) => CredentialKind::Header,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{:?}(<redacted>)", self.kind())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Cookie,
    Header,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::Cookie => f.write_str("cookie"),
            CredentialKind::Header => f.write_str("header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated {
        session: SessionData,
        via: CredentialKind,
    },
    Unauthenticated,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }
}

/// Owns the credential validator and session issuer and decides whether a
/// request acts as the admin.
#[derive(Debug)]
pub struct RequestAuthenticator {
    validator: CredentialValidator,
    issuer: SessionIssuer,
    cookie_name: String,
}

impl RequestAuthenticator {
    pub fn new(
        validator: CredentialValidator,
        issuer: SessionIssuer,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            issuer,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn validator(&self) -> &CredentialValidator {
        &self.validator
    }

    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Credentials present on the request, in resolution order.
    pub fn credentials(&self, headers: &HeaderMap) -> Vec<Credential> {
        let mut found = Vec::with_capacity(2);

        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&self.cookie_name) {
            if !cookie.value().is_empty() {
                found.push(Credential::CookieToken(cookie.value().to_string()));
            }
        }

        if let Some(value) = headers
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if !value.is_empty() {
                found.push(Credential::HeaderSecret(value.to_string()));
            }
        }

        found
    }

    /// Resolve a single credential to a session.
    pub fn resolve(&self, credential: &Credential) -> Option<SessionData> {
        match credential {
            Credential::CookieToken(token) => match self.issuer.verify(token) {
                Ok(session) => Some(session),
                Err(e) => {
                    debug!(error = %e, "Session cookie rejected");
                    None
                }
            },
            Credential::HeaderSecret(secret) => {
                if self.validator.validate(secret) {
                    Some(self.issuer.synthesize())
                } else {
                    warn!("Legacy admin header rejected");
                    None
                }
            }
        }
    }

    /// First credential that resolves wins.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome {
        self.credentials(headers)
            .iter()
            .find_map(|credential| {
                self.resolve(credential).map(|session| AuthOutcome::Authenticated {
                    session,
                    via: credential.kind(),
                })
            })
            .unwrap_or(AuthOutcome::Unauthenticated)
    }
}

/// Extractor that admits only authenticated admin requests.
///
/// Handlers take this as their first argument so the check runs before any
/// body is read or any state is touched.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionData);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    Arc<RequestAuthenticator>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<RequestAuthenticator>::from_ref(state);
        match authenticator.authenticate(&parts.headers) {
            AuthOutcome::Authenticated { session, via } => {
                debug!(via = %via, path = %parts.uri.path(), "Admin request authenticated");
                Ok(AdminSession(session))
            }
            AuthOutcome::Unauthenticated => {
                warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "Rejected unauthenticated admin request"
                );
                Err(AppError::AuthRequired)
            }
        }
    }
}
