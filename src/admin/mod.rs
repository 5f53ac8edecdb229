//! Admin trust boundary.
//!
//! Decides who may mutate soundboard state.
//!
//! ## Security Model
//!
//! - One shared admin secret, configured at startup. Unset means no login.
//! - A successful login yields an HS256 session token in an `HttpOnly`,
//!   `SameSite=Strict` cookie, valid for a fixed lifetime (24h by default).
//! - Tokens are stateless and cannot be revoked; rotating the signing secret
//!   invalidates all of them.
//! - For older clients the admin secret itself is accepted in the
//!   `x-admin-password` header on every request. That path carries the same
//!   exposure as a leaked cookie and does no cryptographic work.
//!
//! ## Usage
//!
//! ```ignore
//! let authenticator = Arc::new(RequestAuthenticator::new(
//!     CredentialValidator::new(config.admin.password.as_deref()),
//!     SessionIssuer::new(config.signing_secret()?, Duration::hours(24)),
//!     "admin-session",
//! ));
//!
//! // In a handler: taking `AdminSession` rejects unauthenticated requests.
//! async fn delete(_admin: AdminSession, ...) -> AppResult<...> { ... }
//! ```

pub mod authenticator;
pub mod credentials;
pub mod routes;
pub mod session;

pub use authenticator::{AdminSession, AuthOutcome, Credential, CredentialKind, RequestAuthenticator};
pub use credentials::{AdminSecret, CredentialValidator};
pub use routes::{auth_routes, SessionCookies};
pub use session::{SessionData, SessionError, SessionIssuer};
