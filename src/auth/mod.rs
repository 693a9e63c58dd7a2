// Authentication module
// JWT-based authentication: registration, login, password change, token
// refresh and the middleware gating every protected route

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::routes;
pub use middleware::{require_auth, AuthenticatedUser};
pub use models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, User,
    UserResponse,
};
pub use service::AuthService;
pub use store::{PgUserStore, UserStore};
pub use token::TokenService;
