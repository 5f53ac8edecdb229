//! Administrator secret check.

use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The single shared admin secret. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AdminSecret(String);

impl AdminSecret {
    /// Returns `None` for an empty value so that an empty setting can never
    /// be matched by an empty submission.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    fn matches(&self, candidate: &str) -> bool {
        // Equal-length digests keep the comparison time independent of where
        // the first mismatching byte is.
        let expected = Sha256::digest(self.0.as_bytes());
        let provided = Sha256::digest(candidate.as_bytes());
        expected
            .iter()
            .zip(provided.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}

/// Compares submitted secrets against the configured admin secret.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    secret: Option<AdminSecret>,
}

impl CredentialValidator {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.and_then(AdminSecret::new),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// True iff a secret is configured and `candidate` equals it exactly.
    pub fn validate(&self, candidate: &str) -> bool {
        match &self.secret {
            Some(secret) => secret.matches(candidate),
            None => {
                warn!("Admin password is not configured; rejecting credential");
                false
            }
        }
    }
}
