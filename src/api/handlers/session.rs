//! Session introspection and logout for the client-held gate cookies.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{
    authenticated_admin, clear_cookie, passkey_verified, state::AdminConfig, PASSKEY_COOKIE,
    SESSION_COOKIE,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub passkey_valid: bool,
    pub authenticated: bool,
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin/session",
    responses(
        (status = 200, description = "Current gate state", body = SessionResponse, content_type = "application/json"),
    ),
    tag = "admin"
)]
// Stateless read of the two gate cookies; lets the client resume at the
// correct step without re-entering earlier gates.
pub async fn session(headers: HeaderMap) -> impl IntoResponse {
    let email = authenticated_admin(&headers);

    Json(SessionResponse {
        passkey_valid: passkey_verified(&headers),
        authenticated: email.is_some(),
        email,
    })
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 204, description = "Gate cookies cleared"),
    ),
    tag = "admin"
)]
pub async fn logout(config: Extension<Arc<AdminConfig>>) -> Response {
    let mut headers = HeaderMap::new();
    for name in [PASSKEY_COOKIE, SESSION_COOKIE] {
        match clear_cookie(name, config.secure_cookies()) {
            Ok(cookie) => {
                headers.append(SET_COOKIE, cookie);
            }
            Err(e) => {
                error!("Error building clearing cookie for {name}: {:?}", e);
            }
        }
    }

    (StatusCode::NO_CONTENT, headers).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::http::{header::COOKIE, HeaderValue};
    use secrecy::SecretString;

    fn config() -> Extension<Arc<AdminConfig>> {
        Extension(Arc::new(AdminConfig::new(
            SecretString::from("sesame".to_string()),
            false,
        )))
    }

    async fn introspect(headers: HeaderMap) -> Result<SessionResponse> {
        let response = session(headers).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[tokio::test]
    async fn session_reports_no_cookies() -> Result<()> {
        let state = introspect(HeaderMap::new()).await?;
        assert!(!state.passkey_valid);
        assert!(!state.authenticated);
        assert_eq!(state.email, None);
        Ok(())
    }

    #[tokio::test]
    async fn session_reports_passkey_only() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("admin_passkey_verified=true"),
        );
        let state = introspect(headers).await?;
        assert!(state.passkey_valid);
        assert!(!state.authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn session_reports_authenticated_email() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static(
                "admin_passkey_verified=true; admin_authenticated=a@x.com",
            ),
        );
        let state = introspect(headers).await?;
        assert!(state.passkey_valid);
        assert!(state.authenticated);
        assert_eq!(state.email.as_deref(), Some("a@x.com"));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_both_cookies() -> Result<()> {
        let response = logout(config()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let cookies: Vec<&str> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies
            .iter()
            .any(|cookie| cookie.starts_with("admin_passkey_verified=;")));
        assert!(cookies
            .iter()
            .any(|cookie| cookie.starts_with("admin_authenticated=;")));
        assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
        Ok(())
    }
}
