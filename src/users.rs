// User resource endpoints
// Thin record-store CRUD over the users table; creation happens through
// /auth/register, so this surface only reads, updates and deletes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::{User, UserResponse};
use crate::error::ApiError;
use crate::AppState;

/// Profile update DTO; password changes go through /auth/change-password
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, role, created_at, updated_at
         FROM users ORDER BY created_at",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = fetch_user(&state, id).await?;
    Ok(Json(user.into()))
}

/// PUT /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;

    let existing = fetch_user(&state, id).await?;

    if let Some(ref new_email) = payload.email {
        if new_email != &existing.email {
            let taken: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id != $2)",
            )
            .bind(new_email)
            .bind(id)
            .fetch_one(&state.db)
            .await?;

            if taken.unwrap_or(false) {
                return Err(ApiError::Conflict {
                    message: "Email already exists".to_string(),
                });
            }
        }
    }

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET full_name = $1, email = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING id, full_name, email, password_hash, role, created_at, updated_at
        "#,
    )
    .bind(payload.full_name.unwrap_or(existing.full_name))
    .bind(payload.email.unwrap_or(existing.email))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated user {}", id);
    Ok(Json(updated.into()))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted user {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_user(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, role, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })
}

/// Routes for the user endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}
