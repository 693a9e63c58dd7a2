mod auth;
mod categories;
mod db;
mod error;
mod question_banks;
mod question_responses;
mod sessions;
mod users;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::get,
    Router,
};
use sqlx::PgPool;

use auth::{AuthService, PgUserStore, TokenService};

/// Application state shared across handlers
///
/// Everything here is constructed once in `main` and injected; there is
/// no ambient global handle. The token service is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Root redirect, allow-listed by the auth gate
async fn index() -> Redirect {
    Redirect::temporary("/docs")
}

/// Creates and configures the application router
///
/// All routes are registered under the auth gate; the gate's allow-list
/// decides which paths skip token verification.
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(categories::routes())
        .merge(sessions::routes())
        .merge(question_banks::routes())
        .merge(question_responses::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(cors)
        .with_state(state)
}

/// Assemble the application state from its injected parts
pub fn build_state(db: PgPool, tokens: Arc<TokenService>) -> AppState {
    let store = Arc::new(PgUserStore::new(db.clone()));
    let auth_service = Arc::new(AuthService::new(store, tokens.clone()));

    AppState {
        db,
        auth: auth_service,
        tokens,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Interview API - Starting...");

    // Both signing secrets are required; refusing to start beats serving
    // unverifiable tokens.
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
        .expect("ACCESS_TOKEN_SECRET must be set in environment");
    let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
        .expect("REFRESH_TOKEN_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    let tokens = Arc::new(TokenService::new(access_secret, refresh_secret));
    let app = create_router(build_state(db_pool, tokens));

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Interview API is running on http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
