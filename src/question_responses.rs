// Question response endpoints
// Per-session answers with the grader's score and comment.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::AppState;

/// Question response record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub answer: String,
    pub score: f64,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub session_id: Uuid,
    pub question_id: Uuid,
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    pub score: f64,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[validate(length(min = 1, message = "Answer cannot be empty"))]
    pub answer: Option<String>,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

/// POST /question-responses
pub async fn create_response(
    State(state): State<AppState>,
    Json(payload): Json<CreateResponse>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate()?;

    let session_exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interview_sessions WHERE id = $1)")
            .bind(payload.session_id)
            .fetch_one(&state.db)
            .await?;
    if !session_exists.unwrap_or(false) {
        return Err(ApiError::NotFound {
            resource: "InterviewSession".to_string(),
            id: payload.session_id.to_string(),
        });
    }

    let question_exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM question_banks WHERE id = $1)")
            .bind(payload.question_id)
            .fetch_one(&state.db)
            .await?;
    if !question_exists.unwrap_or(false) {
        return Err(ApiError::NotFound {
            resource: "QuestionBank".to_string(),
            id: payload.question_id.to_string(),
        });
    }

    let response = sqlx::query_as::<_, QuestionResponse>(
        r#"
        INSERT INTO question_responses (id, session_id, question_id, answer, score, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, session_id, question_id, answer, score, comment
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.session_id)
    .bind(payload.question_id)
    .bind(&payload.answer)
    .bind(payload.score)
    .bind(&payload.comment)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created question response {}", response.id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /question-responses
pub async fn list_responses(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let responses = sqlx::query_as::<_, QuestionResponse>(
        "SELECT id, session_id, question_id, answer, score, comment
         FROM question_responses ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(responses))
}

/// GET /question-responses/:id
pub async fn get_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let response = fetch_response(&state, id).await?;
    Ok(Json(response))
}

/// PUT /question-responses/:id
pub async fn update_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateResponse>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate()?;

    let existing = fetch_response(&state, id).await?;

    let updated = sqlx::query_as::<_, QuestionResponse>(
        r#"
        UPDATE question_responses SET answer = $1, score = $2, comment = $3
        WHERE id = $4
        RETURNING id, session_id, question_id, answer, score, comment
        "#,
    )
    .bind(payload.answer.unwrap_or(existing.answer))
    .bind(payload.score.unwrap_or(existing.score))
    .bind(payload.comment.or(existing.comment))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated question response {}", id);
    Ok(Json(updated))
}

/// DELETE /question-responses/:id
pub async fn delete_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM question_responses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "QuestionResponse".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted question response {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_response(state: &AppState, id: Uuid) -> Result<QuestionResponse, ApiError> {
    sqlx::query_as::<_, QuestionResponse>(
        "SELECT id, session_id, question_id, answer, score, comment
         FROM question_responses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "QuestionResponse".to_string(),
        id: id.to_string(),
    })
}

/// Routes for the question response endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/question-responses",
            get(list_responses).post(create_response),
        )
        .route(
            "/question-responses/:id",
            get(get_response).put(update_response).delete(delete_response),
        )
}
