// HTTP handlers for authentication endpoints

use axum::{extract::State, routing::post, Json, Router};

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
        UserResponse,
    },
};
use crate::AppState;

/// Register a new user
/// POST /auth/register
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.auth.register(request).await?))
}

/// Login a user
/// POST /auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.auth.login(request).await?))
}

/// Change the current user's password
/// POST /auth/change-password (requires bearer token)
pub async fn change_password_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    Ok(Json(state.auth.change_password(user.user_id, request).await?))
}

/// Exchange a refresh token for a new token pair
/// POST /auth/refresh
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.auth.refresh_tokens(&request.refresh_token).await?))
}

/// Routes for the auth endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/change-password", post(change_password_handler))
        .route("/auth/refresh", post(refresh_handler))
}
