// Request-gating middleware for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{error::AuthError, token::TokenService};

/// Path prefixes that bypass token verification: the auth endpoints
/// themselves, the documentation paths and the favicon
const PUBLIC_PREFIXES: &[&str] = &["/auth", "/docs", "/openapi.json", "/favicon.ico"];

fn is_public_path(path: &str) -> bool {
    // The bare root redirect is public too
    path == "/" || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Identity attached to the request once its access token verified
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Gate placed in front of every route
///
/// Allow-listed paths pass straight through. Everything else must carry
/// `Authorization: Bearer <token>` with a valid access token; the decoded
/// subject is inserted into the request extensions so handlers can read
/// the current user id without re-verifying. Any failure short-circuits
/// with a 401 before the downstream handler runs.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return Ok(next.run(request).await);
    }

    let user = authenticate(&tokens, request.headers(), &path)?;
    debug!("Authenticated user {} for {}", user.user_id, path);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn authenticate(
    tokens: &TokenService,
    headers: &axum::http::HeaderMap,
    path: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            warn!("Missing Authorization header in request to {}", path);
            AuthError::MissingToken
        })?
        .to_str()
        .map_err(|_| {
            warn!("Non-ASCII Authorization header in request to {}", path);
            AuthError::InvalidToken
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header missing 'Bearer ' prefix for {}", path);
        AuthError::InvalidToken
    })?;

    let claims = tokens.validate_access_token(token)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The gate already verified protected paths; reuse its attachment.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        // Allow-listed paths (the change-password route lives under /auth)
        // skip the gate, so verify the bearer token here.
        let tokens = Arc::<TokenService>::from_ref(state);
        authenticate(&tokens, &parts.headers, parts.uri.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Json, Router};
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    use crate::auth::token::Claims;

    const ACCESS_SECRET: &str = "test_access_secret_for_testing";
    const REFRESH_SECRET: &str = "test_refresh_secret_for_testing";

    fn test_tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            ACCESS_SECRET.to_string(),
            REFRESH_SECRET.to_string(),
        ))
    }

    async fn whoami(user: AuthenticatedUser) -> Json<Value> {
        Json(json!({ "userId": user.user_id }))
    }

    async fn open() -> &'static str {
        "ok"
    }

    fn test_server(tokens: Arc<TokenService>) -> TestServer {
        let app = Router::new()
            .route("/protected", get(whoami))
            .route("/docs", get(open))
            .layer(middleware::from_fn_with_state(tokens.clone(), require_auth))
            .with_state(tokens);

        TestServer::new(app).unwrap()
    }

    fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_missing_authorization_header_is_401() {
        let server = test_server(test_tokens());
        let response = server.get("/protected").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_authorization_header_is_401() {
        let server = test_server(test_tokens());

        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer", "Bearer not.a.jwt"] {
            let response = server
                .get("/protected")
                .add_header(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap())
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_401() {
        let tokens = test_tokens();
        let server = test_server(tokens);

        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        let (name, value) = bearer(&token);
        let response = server.get("/protected").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_does_not_open_the_gate() {
        let tokens = test_tokens();
        let refresh = tokens.generate_refresh_token(Uuid::new_v4()).unwrap();
        let server = test_server(tokens);

        let (name, value) = bearer(&refresh);
        let response = server.get("/protected").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_subject() {
        let tokens = test_tokens();
        let user_id = Uuid::new_v4();
        let token = tokens.generate_access_token(user_id).unwrap();
        let server = test_server(tokens);

        let (name, value) = bearer(&token);
        let response = server.get("/protected").add_header(name, value).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["userId"], json!(user_id));
    }

    #[tokio::test]
    async fn test_allow_listed_path_bypasses_verification() {
        let server = test_server(test_tokens());
        let response = server.get("/docs").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_401_body_is_generic_for_all_token_failures() {
        let tokens = test_tokens();
        let server = test_server(tokens);

        let missing: Value = server.get("/protected").await.json();

        let (name, value) = bearer("garbage");
        let malformed: Value = server.get("/protected").add_header(name, value).await.json();

        // No enumeration of which check failed
        assert_eq!(missing["error"], malformed["error"]);
        assert_eq!(missing["error"], json!("Could not validate credentials"));
    }

    #[test]
    fn test_public_path_matching() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/docs"));
        assert!(is_public_path("/openapi.json"));
        assert!(is_public_path("/favicon.ico"));
        assert!(!is_public_path("/users"));
        assert!(!is_public_path("/interview-sessions/abc"));
    }
}
