use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, info_span, instrument, Instrument};
use utoipa::ToSchema;

use super::{
    build_cookie, is_unique_violation, normalize_email, passkey_verified, state::AdminConfig,
    valid_email, SESSION_COOKIE,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AdminLogin {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = AdminLogin,
    responses(
        (status = 200, description = "Authenticated, session cookie set", content_type = "application/json"),
        (status = 401, description = "Missing passkey verification or invalid credentials"),
    ),
    tag = "admin"
)]
#[instrument(skip(pool, config, payload))]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    config: Extension<Arc<AdminConfig>>,
    payload: Option<Json<AdminLogin>>,
) -> Response {
    // Fail closed: credentials are not even looked at without the passkey gate.
    if !passkey_verified(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Passkey verification required"})),
        )
            .into_response();
    }

    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing payload"})),
        )
            .into_response();
    };

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email and password are required"})),
        )
            .into_response();
    }

    let email = normalize_email(&payload.email);

    // The email is echoed back as the session cookie value; separators
    // would corrupt the cookie pair list.
    if !valid_email(&email) || email.contains([';', ',']) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email"})),
        )
            .into_response();
    }

    let stored_hash = match lookup_admin(&pool, &email).await {
        Ok(stored_hash) => stored_hash,
        Err(e) => {
            error!("Error looking up admin: {:?}", e);
            return internal_error();
        }
    };

    let message = match stored_hash {
        // First-time setup: an unseen email claims the account with this password.
        None => match provision_admin(&pool, &email, &payload.password).await {
            Ok(()) => "Admin account created successfully",
            Err(ProvisionError::Conflict) => {
                // Lost a race with a concurrent first login; the stored
                // password is whatever that request supplied.
                return invalid_credentials();
            }
            Err(ProvisionError::Internal(e)) => {
                error!("Error provisioning admin: {:?}", e);
                return internal_error();
            }
        },
        Some(stored_hash) => {
            if !password_matches(&payload.password, &stored_hash) {
                return invalid_credentials();
            }
            "Login successful"
        }
    };

    let cookie = match build_cookie(SESSION_COOKIE, &email, config.secure_cookies()) {
        Ok(cookie) => cookie,
        Err(e) => {
            error!("Error building session cookie: {:?}", e);
            return internal_error();
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    (
        StatusCode::OK,
        response_headers,
        Json(json!({"success": true, "message": message})),
    )
        .into_response()
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid email or password"})),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Login failed. Please try again."})),
    )
        .into_response()
}

enum ProvisionError {
    Conflict,
    Internal(anyhow::Error),
}

async fn lookup_admin(pool: &PgPool, email: &str) -> Result<Option<String>, sqlx::Error> {
    let query = "SELECT password_hash FROM admins WHERE email = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| row.get("password_hash")))
}

async fn provision_admin(pool: &PgPool, email: &str, password: &str) -> Result<(), ProvisionError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ProvisionError::Internal(anyhow::anyhow!("hash_password: {e}")))?
        .to_string();

    let query = "INSERT INTO admins (email, password_hash) VALUES ($1, $2)";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(&password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProvisionError::Conflict
            } else {
                ProvisionError::Internal(e.into())
            }
        })?;

    Ok(())
}

/// Argon2 verification; comparison is constant-time inside the hash check.
fn password_matches(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        error!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
