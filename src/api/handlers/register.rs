use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error, info_span, instrument, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{is_unique_violation, normalize_email, valid_email};
use crate::api::qr;

/// Scan codes are namespaced so stray QR payloads are rejected on sight.
const QR_VALUE_PREFIX: &str = "HACKWHACK";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamRegister {
    team_name: String,
    leader_name: String,
    email: String,
    phone: String,
    college: String,
    #[serde(default)]
    members: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    /// PNG data URL of the team's scan code.
    pub qr_code: String,
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = TeamRegister,
    responses(
        (status = 200, description = "Team registered, scan code returned", body = RegisterResponse, content_type = "application/json"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "A team with the specified email already exists"),
    ),
    tag = "register"
)]
#[instrument(skip(pool, payload))]
pub async fn register(pool: Extension<PgPool>, payload: Option<Json<TeamRegister>>) -> Response {
    let team: TeamRegister = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing payload"})),
            )
                .into_response()
        }
    };

    debug!("team: {:?}", team);

    let required = [
        &team.team_name,
        &team.leader_name,
        &team.email,
        &team.phone,
        &team.college,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "All required fields must be filled"})),
        )
            .into_response();
    }

    let email = normalize_email(&team.email);
    if !valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email"})),
        )
            .into_response();
    }

    let members = match serde_json::to_string(&team.members) {
        Ok(members) => members,
        Err(e) => {
            error!("Error serializing members: {:?}", e);
            return internal_error();
        }
    };

    // Unique by generation scheme; the qr_value index backs it up.
    let qr_value = format!("{QR_VALUE_PREFIX}-{}", Uuid::new_v4());

    match insert_team(&pool, &team, &email, &members, &qr_value).await {
        Ok(()) => (),
        Err(e) if is_unique_violation(&e) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "A team with this email is already registered"})),
            )
                .into_response();
        }
        Err(e) => {
            error!("Error inserting team: {:?}", e);
            return internal_error();
        }
    }

    let qr_code = match qr::data_url(&qr_value) {
        Ok(qr_code) => qr_code,
        Err(e) => {
            error!("Error rendering QR code: {:?}", e);
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(RegisterResponse {
            success: true,
            message: "Team registered successfully".to_string(),
            qr_code,
        }),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Failed to register team. Please try again."})),
    )
        .into_response()
}

async fn insert_team(
    pool: &PgPool,
    team: &TeamRegister,
    email: &str,
    members: &str,
    qr_value: &str,
) -> Result<(), sqlx::Error> {
    let query = r"
        INSERT INTO teams (team_name, leader_name, email, phone, college, members, qr_value)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(team.team_name.trim())
        .bind(team.leader_name.trim())
        .bind(email)
        .bind(team.phone.trim())
        .bind(team.college.trim())
        .bind(members)
        .bind(qr_value)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(())
}
