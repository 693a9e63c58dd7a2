// Authentication service - business logic layer

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, NewUser, RegisterRequest, User,
        UserResponse,
    },
    password::PasswordService,
    store::UserStore,
    token::TokenService,
};

/// Role assigned to every self-registered account
const DEFAULT_ROLE: &str = "user";

/// Authentication service coordinating the user store, password hashing
/// and token issuance
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService over an injected store and token service
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new user
    ///
    /// Fails with a validation error when the passwords do not match, and
    /// with a duplicate error when the email is taken. The email pre-check
    /// is only a fast path: under concurrent registration the store's
    /// uniqueness constraint decides, and the service surfaces its verdict.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        if request.password != request.confirm_password {
            return Err(AuthError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .store
            .create(NewUser {
                full_name: request.full_name,
                email: request.email,
                password_hash,
                role: DEFAULT_ROLE.to_string(),
            })
            .await?;

        tracing::info!("Registered new user {}", user.id);
        self.issue_pair(user)
    }

    /// Login with email and password
    ///
    /// Absent user and wrong password produce the identical error, so the
    /// response carries no account-enumeration signal.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let user = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!("User {} logged in", user.id);
        self.issue_pair(user)
    }

    /// Change the password of an authenticated user
    ///
    /// Requires the old password to verify; returns the updated user and
    /// deliberately mints no new tokens.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<UserResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        if request.new_password != request.confirm_password {
            return Err(AuthError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.old_password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = PasswordService::hash_password(&request.new_password)?;
        let updated = self
            .store
            .update_password(user_id, &password_hash)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!("User {} changed password", user_id);
        Ok(updated.into())
    }

    /// Mint a fresh token pair from a valid refresh token
    ///
    /// Stateless by design: the presented refresh token stays valid until
    /// its natural expiry, there is no server-side revocation.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        tracing::debug!("Refreshed tokens for user {}", user.id);
        self.issue_pair(user)
    }

    fn issue_pair(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) = self.tokens.generate_token_pair(user.id)?;
        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryUserStore;

    fn test_service() -> AuthService {
        let tokens = Arc::new(TokenService::new(
            "test_access_secret_for_testing".to_string(),
            "test_refresh_secret_for_testing".to_string(),
        ));
        AuthService::new(Arc::new(MemoryUserStore::new()), tokens)
    }

    fn register_request(email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_tokens_and_user() {
        let service = test_service();
        let response = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.user.email, "a@x.com");
        assert_eq!(response.user.role, "user");
    }

    #[tokio::test]
    async fn test_register_response_never_exposes_password() {
        let service = test_service();
        let response = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        let user = value.get("user").unwrap().as_object().unwrap();
        assert!(!user.contains_key("password"));
        assert!(!user.contains_key("passwordHash"));
        assert!(!serde_json::to_string(&value).unwrap().contains("secret1"));
    }

    #[tokio::test]
    async fn test_register_password_mismatch_is_validation_error() {
        let service = test_service();
        let result = service
            .register(register_request("a@x.com", "secret1", "secret2"))
            .await;

        assert!(matches!(result, Err(AuthError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_rejected() {
        let service = test_service();
        service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let result = service
            .register(register_request("a@x.com", "other99", "other99"))
            .await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_success_mints_fresh_pair() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let logged_in = service
            .login(login_request("a@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(logged_in.user.id, registered.user.id);
        assert!(!logged_in.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = test_service();
        service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let wrong_password = service
            .login(login_request("a@x.com", "wrong12"))
            .await
            .unwrap_err();
        let unknown_user = service
            .login(login_request("b@x.com", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        service
            .change_password(
                registered.user.id,
                ChangePasswordRequest {
                    old_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                    confirm_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap();

        // New password works, old one no longer does
        assert!(service.login(login_request("a@x.com", "secret2")).await.is_ok());
        assert!(matches!(
            service.login(login_request("a@x.com", "secret1")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let result = service
            .change_password(
                registered.user.id,
                ChangePasswordRequest {
                    old_password: "wrong12".to_string(),
                    new_password: "secret2".to_string(),
                    confirm_password: "secret2".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_mismatch_is_validation_error() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let result = service
            .change_password(
                registered.user.id,
                ChangePasswordRequest {
                    old_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                    confirm_password: "secret3".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AuthError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_refresh_tokens_mints_new_pair() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let refreshed = service
            .refresh_tokens(&registered.refresh_token)
            .await
            .unwrap();

        assert_eq!(refreshed.user.id, registered.user.id);
        assert!(!refreshed.access_token.is_empty());
        assert!(!refreshed.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let service = test_service();
        let registered = service
            .register(register_request("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        // Access tokens must not pass where a refresh token is expected
        let result = service.refresh_tokens(&registered.access_token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage() {
        let service = test_service();
        let result = service.refresh_tokens("not.a.token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
