//! Signed, time-limited admin session tokens.
//!
//! Tokens are HS256 JWTs carrying `{isAuthenticated, timestamp, iat, exp}`.
//! There is no server-side session table: a token that verifies and has not
//! expired is valid, and logging out only discards the client's copy.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded session payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub is_authenticated: bool,
    /// Issuance time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

impl SessionData {
    fn new(issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            is_authenticated: true,
            timestamp: issued_at.timestamp_millis(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Why a token was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token expired")]
    Expired,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token is malformed: {0}")]
    Malformed(String),

    #[error("session token does not grant admin access")]
    NotAuthenticated,

    #[error("failed to sign session token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => SessionError::Expired,
            ErrorKind::InvalidSignature => SessionError::InvalidSignature,
            _ => SessionError::Malformed(err.to_string()),
        }
    }
}

/// Mints and verifies session tokens with a process-wide signing key.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionIssuer {
    pub fn new(signing_secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding: DecodingKey::from_secret(signing_secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token valid from now for the configured lifetime.
    pub fn issue(&self) -> Result<String, SessionError> {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionData::new(issued_at, self.lifetime);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the payload.
    pub fn verify(&self, token: &str) -> Result<SessionData, SessionError> {
        let data = decode::<SessionData>(token, &self.decoding, &self.validation)?.claims;
        if !data.is_authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        Ok(data)
    }

    /// Session for a request authenticated by the legacy header. Never
    /// serialized or handed to the client.
    pub fn synthesize(&self) -> SessionData {
        SessionData::new(Utc::now(), self.lifetime)
    }
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new("test-signing-secret", Duration::hours(24))
    }

    #[test]
    fn test_fresh_token_verifies() {
        let issuer = issuer();
        let token = issuer.issue().unwrap();
        let data = issuer.verify(&token).unwrap();

        assert!(data.is_authenticated);
        assert_eq!(data.exp - data.iat, 24 * 60 * 60);
        assert_eq!(data.timestamp / 1000, data.iat);
    }

    #[test]
    fn test_token_within_window_verifies() {
        let issuer = issuer();
        let token = issuer.issue_at(Utc::now() - Duration::hours(23)).unwrap();
        assert!(issuer.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let token = issuer.issue_at(Utc::now() - Duration::hours(25)).unwrap();
        assert_eq!(issuer.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = issuer();
        let token = issuer.issue().unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let sig = &parts[2];
        let replacement = if sig.starts_with('A') { "B" } else { "A" };
        parts[2] = format!("{}{}", replacement, &sig[1..]);
        let tampered = parts.join(".");

        assert_eq!(issuer.verify(&tampered), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let other = SessionIssuer::new("another-secret", Duration::hours(24));
        let token = other.issue().unwrap();
        assert_eq!(issuer().verify(&token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = issuer().verify("not-a-token");
        assert!(matches!(result, Err(SessionError::Malformed(_))));

        let result = issuer().verify("");
        assert!(matches!(result, Err(SessionError::Malformed(_))));
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let data = SessionData::new(Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["isAuthenticated"], true);
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_synthesized_session() {
        let data = issuer().synthesize();
        assert!(data.is_authenticated);
        assert!(data.expires_at().unwrap() > Utc::now());
    }
}
