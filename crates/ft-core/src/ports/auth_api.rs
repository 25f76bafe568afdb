//! Backend auth API port
//!
//! The server owns signup/signin/refresh/signout; the client only exchanges
//! credentials for a token pair and hands it to the session container.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{BearerToken, SignInPayload, UserProfile};

#[derive(Debug, Error)]
pub enum AuthApiError {
    /// The server answered with a non-success status.
    #[error("auth api rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth api transport failed: {0}")]
    Transport(String),

    #[error("auth api response invalid: {0}")]
    InvalidResponse(String),
}

impl AuthApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthApiError::Rejected { status: 401, .. })
    }
}

/// Email/password pair. `Debug` never prints the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `{user, accessToken, refreshToken}` as returned by `/signup` and `/signin`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user.id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl From<AuthResponse> for SignInPayload {
    fn from(response: AuthResponse) -> Self {
        SignInPayload {
            access_token: BearerToken::new(response.access_token),
            refresh_token: response.refresh_token.map(BearerToken::new),
            user: response.user,
        }
    }
}

/// New token pair from `/refresh`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenPair([REDACTED])")
    }
}

#[async_trait]
pub trait AuthApiPort: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, AuthApiError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, AuthApiError>;

    /// Exchange a refresh token for a new pair; the old one is invalidated server-side.
    async fn refresh(&self, refresh_token: &BearerToken) -> Result<TokenPair, AuthApiError>;

    /// Invalidate `refresh_token` on the server.
    async fn sign_out(&self, refresh_token: &BearerToken) -> Result<(), AuthApiError>;

    /// Profile for the bearer token.
    async fn me(&self, access_token: &BearerToken) -> Result<UserProfile, AuthApiError>;
}
