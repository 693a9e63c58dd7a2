// Interview category endpoints
// Categories carry the system prompt driving a practice interview.

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
use validator::Validate;

use crate::error::ApiError;
use crate::AppState;

/// Interview category record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub system_prompt: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "System prompt is required"))]
    pub system_prompt: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Slug cannot be empty"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "System prompt cannot be empty"))]
    pub system_prompt: Option<String>,
    pub language: Option<String>,
}

/// POST /interview-categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<InterviewCategory>), ApiError> {
    payload.validate()?;

    let taken: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interview_categories WHERE slug = $1)")
            .bind(&payload.slug)
            .fetch_one(&state.db)
            .await?;

    if taken.unwrap_or(false) {
        return Err(ApiError::Conflict {
            message: format!("Category with slug '{}' already exists", payload.slug),
        });
    }

    let category = sqlx::query_as::<_, InterviewCategory>(
        r#"
        INSERT INTO interview_categories (id, name, slug, system_prompt, language, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING id, name, slug, system_prompt, language, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.slug)
    .bind(&payload.system_prompt)
    .bind(payload.language.as_deref().unwrap_or("vi-VN"))
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created interview category {}", category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /interview-categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewCategory>>, ApiError> {
    let categories = sqlx::query_as::<_, InterviewCategory>(
        "SELECT id, name, slug, system_prompt, language, created_at
         FROM interview_categories ORDER BY created_at",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(categories))
}

/// GET /interview-categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewCategory>, ApiError> {
    let category = fetch_category(&state, id).await?;
    Ok(Json(category))
}

/// PUT /interview-categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategory>,
) -> Result<Json<InterviewCategory>, ApiError> {
    payload.validate()?;

    let existing = fetch_category(&state, id).await?;

    let updated = sqlx::query_as::<_, InterviewCategory>(
        r#"
        UPDATE interview_categories
        SET name = $1, slug = $2, system_prompt = $3, language = $4
        WHERE id = $5
        RETURNING id, name, slug, system_prompt, language, created_at
        "#,
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.slug.unwrap_or(existing.slug))
    .bind(payload.system_prompt.unwrap_or(existing.system_prompt))
    .bind(payload.language.unwrap_or(existing.language))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated interview category {}", id);
    Ok(Json(updated))
}

/// DELETE /interview-categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM interview_categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "InterviewCategory".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted interview category {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_category(state: &AppState, id: Uuid) -> Result<InterviewCategory, ApiError> {
    sqlx::query_as::<_, InterviewCategory>(
        "SELECT id, name, slug, system_prompt, language, created_at
         FROM interview_categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "InterviewCategory".to_string(),
        id: id.to_string(),
    })
}

/// Routes for the interview category endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/interview-categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/interview-categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}
