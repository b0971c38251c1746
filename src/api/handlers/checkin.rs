use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::{error, info_span, instrument, Instrument};
use utoipa::ToSchema;

use super::authenticated_admin;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    qr_value: String,
}

/// Outcome of the conditional check-in update.
#[derive(Debug)]
enum CheckinOutcome {
    /// The team was not yet checked in; this scan flipped the flag.
    CheckedIn(String),
    /// The code resolved to a team whose flag was already set.
    AlreadyCheckedIn(String),
    /// No team carries this code.
    NotFound,
}

#[utoipa::path(
    post,
    path = "/admin/checkin",
    request_body = CheckinRequest,
    responses(
        (status = 200, description = "Team checked in", content_type = "application/json"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Unknown scan code"),
        (status = 409, description = "Team already checked in"),
    ),
    tag = "admin"
)]
#[instrument(skip(pool, payload))]
pub async fn checkin(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<CheckinRequest>>,
) -> Response {
    if authenticated_admin(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authentication required"})),
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

    let qr_value = payload.qr_value.trim();
    if qr_value.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "QR code value is required"})),
        )
            .into_response();
    }

    match checkin_team(&pool, qr_value).await {
        Ok(CheckinOutcome::CheckedIn(team_name)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Team \"{team_name}\" checked in successfully!"),
            })),
        )
            .into_response(),
        Ok(CheckinOutcome::AlreadyCheckedIn(team_name)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": format!("Team \"{team_name}\" is already checked in"),
            })),
        )
            .into_response(),
        Ok(CheckinOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Invalid QR code - Team not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Error checking in team: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Check-in failed. Please try again."})),
            )
                .into_response()
        }
    }
}

/// Flip `checked_in` with a single conditional update.
///
/// The `checked_in = FALSE` predicate makes the transition atomic: of two
/// near-simultaneous scans of the same code, exactly one update matches a
/// row and the other falls through to the conflict branch.
async fn checkin_team(pool: &PgPool, qr_value: &str) -> Result<CheckinOutcome, sqlx::Error> {
    let query = r"
        UPDATE teams SET checked_in = TRUE
        WHERE qr_value = $1 AND checked_in = FALSE
        RETURNING team_name
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(qr_value)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    if let Some(row) = row {
        return Ok(CheckinOutcome::CheckedIn(row.get("team_name")));
    }

    // No row updated: distinguish an unknown code from a duplicate scan.
    let query = "SELECT team_name FROM teams WHERE qr_value = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(qr_value)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map_or(CheckinOutcome::NotFound, |row| {
        CheckinOutcome::AlreadyCheckedIn(row.get("team_name"))
    }))
}
