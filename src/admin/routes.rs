//! Login, logout and session check endpoints.

use crate::admin::authenticator::{AdminSession, RequestAuthenticator};
use crate::error::{AppError, AppResult};
use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use soundboard_types::{ApiResponse, LoginRequest, MessageData, VerifyData};
use std::sync::Arc;
use tracing::{info, warn};

/// Attributes of the session cookie the login endpoint sets.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    pub secure: bool,
}

impl SessionCookies {
    fn session(&self, name: &str, token: String, max_age: chrono::Duration) -> Cookie<'static> {
        Cookie::build((name.to_string(), token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::seconds(max_age.num_seconds()))
            .build()
    }

    fn cleared(&self, name: &str) -> Cookie<'static> {
        let mut cookie = Cookie::build((name.to_string(), ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .build();
        cookie.make_removal();
        cookie
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

/// Handler: POST /api/auth/login
///
/// Checks the submitted secret and sets the session cookie on success.
async fn login(
    State(auth): State<Arc<RequestAuthenticator>>,
    State(cookies): State<SessionCookies>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<ApiResponse<MessageData>>)> {
    let Json(request) = payload?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or(AppError::MissingPassword)?;

    if !auth.validator().validate(&password) {
        warn!("Admin login failed");
        return Err(AppError::InvalidPassword);
    }

    let token = auth
        .issuer()
        .issue()
        .map_err(|e| AppError::internal(e.to_string()))?;
    info!(
        lifetime_hours = auth.issuer().lifetime().num_hours(),
        "Admin logged in"
    );

    let cookie = cookies.session(auth.cookie_name(), token, auth.issuer().lifetime());
    Ok((
        jar.add(cookie),
        Json(ApiResponse::ok(MessageData::new("Authentication successful"))),
    ))
}

/// Handler: POST /api/auth/logout
///
/// Tells the client to drop its cookie. The token itself stays valid until
/// it expires.
async fn logout(
    State(auth): State<Arc<RequestAuthenticator>>,
    State(cookies): State<SessionCookies>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageData>>) {
    info!("Admin logged out");
    (
        jar.add(cookies.cleared(auth.cookie_name())),
        Json(ApiResponse::ok(MessageData::new("Logout successful"))),
    )
}

/// Handler: GET /api/auth/verify
async fn verify(_session: AdminSession) -> Json<ApiResponse<VerifyData>> {
    Json(ApiResponse::ok(VerifyData {
        authenticated: true,
    }))
}

/// Authentication routes, mounted under `/api/auth`.
pub fn auth_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<RequestAuthenticator>: FromRef<S>,
    SessionCookies: FromRef<S>,
{
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify", get(verify))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::credentials::CredentialValidator;
    use crate::admin::session::SessionIssuer;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    #[derive(Clone, FromRef)]
    struct TestState {
        auth: Arc<RequestAuthenticator>,
        cookies: SessionCookies,
    }

    fn app() -> Router {
        let state = TestState {
            auth: Arc::new(RequestAuthenticator::new(
                CredentialValidator::new(Some("pw")),
                SessionIssuer::new("key", chrono::Duration::hours(24)),
                "admin-session",
            )),
            cookies: SessionCookies { secure: true },
        };
        Router::new().nest("/api/auth", auth_routes()).with_state(state)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let resp = app()
            .oneshot(login_request(r#"{"password":"pw"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("admin-session="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=86400"));

        let json = json_body(resp).await;
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_login_missing_password() {
        let resp = app().oneshot(login_request("{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"]["code"], 1002);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let resp = app()
            .oneshot(login_request(r#"{"password":"nope"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(json_body(resp).await["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn test_login_malformed_body() {
        let resp = app().oneshot(login_request("not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"]["code"], 1303);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let resp = app()
            .oneshot(
                Request::post("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("admin-session="));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_verify_requires_session() {
        let resp = app()
            .oneshot(Request::get("/api/auth/verify").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app()
            .oneshot(
                Request::get("/api/auth/verify")
                    .header("x-admin-password", "pw")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["data"]["authenticated"], true);
    }
}
