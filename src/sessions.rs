// Interview session endpoints
// A session ties the authenticated user to a category. The room URL is an
// inert string assigned at creation; no real-time mechanics live here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::AppState;

const STATUS_SCHEDULED: &str = "SCHEDULED";
const STATUS_COMPLETED: &str = "COMPLETED";

/// Interview session record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub daily_room_url: String,
    pub status: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSession {
    pub status: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
}

/// POST /interview-sessions
/// The owner is always the caller; clients cannot create sessions for
/// other users.
pub async fn create_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSession>,
) -> Result<(StatusCode, Json<InterviewSession>), ApiError> {
    let category_exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interview_categories WHERE id = $1)")
            .bind(payload.category_id)
            .fetch_one(&state.db)
            .await?;

    if !category_exists.unwrap_or(false) {
        return Err(ApiError::NotFound {
            resource: "InterviewCategory".to_string(),
            id: payload.category_id.to_string(),
        });
    }

    let session_id = Uuid::new_v4();
    let session = sqlx::query_as::<_, InterviewSession>(
        r#"
        INSERT INTO interview_sessions
            (id, user_id, category_id, daily_room_url, status, start_time, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING id, user_id, category_id, daily_room_url, status, start_time, end_time, created_at
        "#,
    )
    .bind(session_id)
    .bind(user.user_id)
    .bind(payload.category_id)
    .bind(format!("https://daily.co/rooms/{}", session_id))
    .bind(STATUS_SCHEDULED)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created interview session {} for user {}", session.id, user.user_id);
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /interview-sessions
/// Lists only the caller's sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<InterviewSession>>, ApiError> {
    let sessions = sqlx::query_as::<_, InterviewSession>(
        "SELECT id, user_id, category_id, daily_room_url, status, start_time, end_time, created_at
         FROM interview_sessions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(sessions))
}

/// GET /interview-sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSession>, ApiError> {
    let session = fetch_session(&state, id).await?;
    ensure_owner(&session, user.user_id)?;
    Ok(Json(session))
}

/// PUT /interview-sessions/:id
pub async fn update_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSession>,
) -> Result<Json<InterviewSession>, ApiError> {
    let existing = fetch_session(&state, id).await?;
    ensure_owner(&existing, user.user_id)?;

    let status = payload.status.unwrap_or(existing.status);
    let end_time = resolved_end_time(&status, payload.end_time, existing.end_time);

    let updated = sqlx::query_as::<_, InterviewSession>(
        r#"
        UPDATE interview_sessions SET status = $1, end_time = $2
        WHERE id = $3
        RETURNING id, user_id, category_id, daily_room_url, status, start_time, end_time, created_at
        "#,
    )
    .bind(&status)
    .bind(end_time)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated interview session {}", id);
    Ok(Json(updated))
}

/// DELETE /interview-sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = fetch_session(&state, id).await?;
    ensure_owner(&session, user.user_id)?;

    sqlx::query("DELETE FROM interview_sessions WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!("Deleted interview session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_session(state: &AppState, id: Uuid) -> Result<InterviewSession, ApiError> {
    sqlx::query_as::<_, InterviewSession>(
        "SELECT id, user_id, category_id, daily_room_url, status, start_time, end_time, created_at
         FROM interview_sessions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "InterviewSession".to_string(),
        id: id.to_string(),
    })
}

/// Sessions belong to the user who created them. Anyone else gets the same
/// NotFound as for an id that does not exist, so session ids cannot be
/// probed across accounts.
fn ensure_owner(session: &InterviewSession, user_id: Uuid) -> Result<(), ApiError> {
    if session.user_id != user_id {
        return Err(ApiError::NotFound {
            resource: "InterviewSession".to_string(),
            id: session.id.to_string(),
        });
    }
    Ok(())
}

/// A session moving to COMPLETED gets its end time stamped automatically
/// when the caller did not supply one.
fn resolved_end_time(
    status: &str,
    requested: Option<DateTime<Utc>>,
    existing: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    requested.or(existing).or_else(|| {
        if status == STATUS_COMPLETED {
            Some(Utc::now())
        } else {
            None
        }
    })
}

/// Routes for the interview session endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/interview-sessions",
            get(list_sessions).post(create_session),
        )
        .route(
            "/interview-sessions/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_owned_by(user_id: Uuid) -> InterviewSession {
        InterviewSession {
            id: Uuid::new_v4(),
            user_id,
            category_id: Uuid::new_v4(),
            daily_room_url: "https://daily.co/rooms/test".to_string(),
            status: STATUS_SCHEDULED.to_string(),
            start_time: Some(Utc::now()),
            end_time: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_passes_ownership_check() {
        let owner = Uuid::new_v4();
        let session = session_owned_by(owner);

        assert!(ensure_owner(&session, owner).is_ok());
    }

    #[test]
    fn test_other_user_gets_not_found() {
        let session = session_owned_by(Uuid::new_v4());
        let intruder = Uuid::new_v4();

        // Same error as a nonexistent id, no ownership signal leaks
        let err = ensure_owner(&session, intruder).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[test]
    fn test_completing_a_session_stamps_end_time() {
        let end_time = resolved_end_time(STATUS_COMPLETED, None, None);
        assert!(end_time.is_some());
    }

    #[test]
    fn test_explicit_end_time_wins_over_auto_stamp() {
        let requested = Utc::now();
        let end_time = resolved_end_time(STATUS_COMPLETED, Some(requested), None);
        assert_eq!(end_time, Some(requested));
    }

    #[test]
    fn test_non_completed_status_leaves_end_time_unset() {
        assert_eq!(resolved_end_time(STATUS_SCHEDULED, None, None), None);
        assert_eq!(resolved_end_time("IN_PROGRESS", None, None), None);
    }

    #[test]
    fn test_existing_end_time_is_preserved() {
        let existing = Utc::now();
        let end_time = resolved_end_time(STATUS_COMPLETED, None, Some(existing));
        assert_eq!(end_time, Some(existing));
    }
}
