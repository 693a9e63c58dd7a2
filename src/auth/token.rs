// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub exp: i64,  // expiration timestamp
    pub iat: i64,  // issued at timestamp
}

/// Token service for JWT operations
///
/// Access and refresh tokens are signed with independent secrets, so a
/// token of one class can never validate as the other. Both secrets are
/// loaded once at startup and read-only afterwards.
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService from the two signing secrets
    /// Access tokens expire in 24 hours, refresh tokens in 7 days
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_token_duration: 86_400,   // 24 hours
            refresh_token_duration: 604_800, // 7 days
        }
    }

    /// Generate an access token (24 hours)
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.sign_token(user_id, self.access_token_duration, &self.access_secret)
    }

    /// Generate a refresh token (7 days)
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.sign_token(user_id, self.refresh_token_duration, &self.refresh_secret)
    }

    /// Validate an access token against the access secret
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        Self::validate_token(token, &self.access_secret)
    }

    /// Validate a refresh token against the refresh secret
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        Self::validate_token(token, &self.refresh_secret)
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(&self, user_id: Uuid) -> Result<(String, String), AuthError> {
        let access_token = self.generate_access_token(user_id)?;
        let refresh_token = self.generate_refresh_token(user_id)?;
        Ok((access_token, refresh_token))
    }

    fn sign_token(&self, user_id: Uuid, duration: i64, secret: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}
