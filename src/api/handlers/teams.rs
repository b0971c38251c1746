use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::{error, info_span, instrument, Instrument};
use utoipa::ToSchema;

use super::authenticated_admin;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Team {
    pub team_id: i64,
    pub team_name: String,
    pub leader_name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    /// Member names, expanded from the stored JSON text.
    pub members: Vec<String>,
    pub qr_value: String,
    pub checked_in: bool,
    pub created_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/admin/teams",
    responses(
        (status = 200, description = "All registered teams, newest first", content_type = "application/json"),
        (status = 401, description = "Authentication required"),
    ),
    tag = "admin"
)]
#[instrument(skip(pool))]
pub async fn teams(headers: HeaderMap, pool: Extension<PgPool>) -> Response {
    if authenticated_admin(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authentication required"})),
        )
            .into_response();
    }

    match fetch_teams(&pool).await {
        Ok(teams) => (StatusCode::OK, Json(json!({"teams": teams}))).into_response(),
        Err(e) => {
            error!("Error fetching teams: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch teams"})),
            )
                .into_response()
        }
    }
}

async fn fetch_teams(pool: &PgPool) -> Result<Vec<Team>, sqlx::Error> {
    let query = r"
        SELECT team_id, team_name, leader_name, email, phone, college,
               members, qr_value, checked_in, created_at
        FROM teams
        ORDER BY created_at DESC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let members: String = row.get("members");
            Team {
                team_id: row.get("team_id"),
                team_name: row.get("team_name"),
                leader_name: row.get("leader_name"),
                email: row.get("email"),
                phone: row.get("phone"),
                college: row.get("college"),
                // Malformed member text degrades to an empty list instead of
                // failing the whole listing.
                members: serde_json::from_str(&members).unwrap_or_default(),
                qr_value: row.get("qr_value"),
                checked_in: row.get("checked_in"),
                created_at: row.get("created_at"),
            }
        })
        .collect())
}
