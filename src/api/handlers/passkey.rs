use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

use super::{build_cookie, state::AdminConfig, PASSKEY_COOKIE};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PasskeyVerify {
    passkey: String,
}

#[utoipa::path(
    post,
    path = "/admin/verify-passkey",
    request_body = PasskeyVerify,
    responses(
        (status = 200, description = "Passkey accepted, marker cookie set", content_type = "application/json"),
        (status = 401, description = "Invalid passkey"),
    ),
    tag = "admin"
)]
#[instrument(skip(config, payload))]
pub async fn verify_passkey(
    config: Extension<Arc<AdminConfig>>,
    payload: Option<Json<PasskeyVerify>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing payload"})),
        )
            .into_response();
    };

    // A mismatch reports the same generic failure regardless of reason.
    if !config.passkey_matches(&payload.passkey) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid passkey"})),
        )
            .into_response();
    }

    let cookie = match build_cookie(PASSKEY_COOKIE, "true", config.secure_cookies()) {
        Ok(cookie) => cookie,
        Err(e) => {
            error!("Error building passkey cookie: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Verification failed"})),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    (StatusCode::OK, headers, Json(json!({"success": true}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use secrecy::SecretString;

    fn config() -> Extension<Arc<AdminConfig>> {
        Extension(Arc::new(AdminConfig::new(
            SecretString::from("sesame".to_string()),
            false,
        )))
    }

    #[tokio::test]
    async fn verify_passkey_missing_payload() {
        let response = verify_passkey(config(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_passkey_rejects_mismatch() {
        let payload = PasskeyVerify {
            passkey: "wrong".to_string(),
        };
        let response = verify_passkey(config(), Some(Json(payload))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn verify_passkey_sets_marker_cookie() -> Result<()> {
        let payload = PasskeyVerify {
            passkey: "sesame".to_string(),
        };
        let response = verify_passkey(config(), Some(Json(payload))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .context("missing Set-Cookie")?
            .to_str()?;
        assert!(cookie.starts_with("admin_passkey_verified=true"));
        assert!(cookie.contains("SameSite=Strict"));
        Ok(())
    }
}
