// Question bank endpoints
// Reusable interview questions grouped by category.

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

/// Question bank record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: Uuid,
    pub category_id: Uuid,
    pub question_text: String,
    pub expected_answer: String,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestion {
    pub category_id: Uuid,
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question_text: String,
    #[validate(length(min = 1, message = "Expected answer is required"))]
    pub expected_answer: String,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestion {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: Option<String>,
    #[validate(length(min = 1, message = "Expected answer cannot be empty"))]
    pub expected_answer: Option<String>,
    pub difficulty: Option<String>,
}

/// POST /question-banks
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestion>,
) -> Result<(StatusCode, Json<QuestionBank>), ApiError> {
    payload.validate()?;

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

    let question = sqlx::query_as::<_, QuestionBank>(
        r#"
        INSERT INTO question_banks (id, category_id, question_text, expected_answer, difficulty)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, category_id, question_text, expected_answer, difficulty
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.category_id)
    .bind(&payload.question_text)
    .bind(&payload.expected_answer)
    .bind(&payload.difficulty)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created question {}", question.id);
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /question-banks
pub async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionBank>>, ApiError> {
    let questions = sqlx::query_as::<_, QuestionBank>(
        "SELECT id, category_id, question_text, expected_answer, difficulty
         FROM question_banks ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(questions))
}

/// GET /question-banks/:id
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionBank>, ApiError> {
    let question = fetch_question(&state, id).await?;
    Ok(Json(question))
}

/// PUT /question-banks/:id
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestion>,
) -> Result<Json<QuestionBank>, ApiError> {
    payload.validate()?;

    let existing = fetch_question(&state, id).await?;

    let updated = sqlx::query_as::<_, QuestionBank>(
        r#"
        UPDATE question_banks
        SET category_id = $1, question_text = $2, expected_answer = $3, difficulty = $4
        WHERE id = $5
        RETURNING id, category_id, question_text, expected_answer, difficulty
        "#,
    )
    .bind(payload.category_id.unwrap_or(existing.category_id))
    .bind(payload.question_text.unwrap_or(existing.question_text))
    .bind(payload.expected_answer.unwrap_or(existing.expected_answer))
    .bind(payload.difficulty.or(existing.difficulty))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated question {}", id);
    Ok(Json(updated))
}

/// DELETE /question-banks/:id
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM question_banks WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "QuestionBank".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted question {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_question(state: &AppState, id: Uuid) -> Result<QuestionBank, ApiError> {
    sqlx::query_as::<_, QuestionBank>(
        "SELECT id, category_id, question_text, expected_answer, difficulty
         FROM question_banks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "QuestionBank".to_string(),
        id: id.to_string(),
    })
}

/// Routes for the question bank endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/question-banks", get(list_questions).post(create_question))
        .route(
            "/question-banks/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
}
