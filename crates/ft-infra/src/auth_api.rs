//! HTTP client for the backend auth API.

use std::time::Duration;

use async_trait::async_trait;
use ft_core::ports::{AuthApiError, AuthApiPort, AuthResponse, Credentials, SignUpRequest, TokenPair};
use ft_core::{BearerToken, UserProfile};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenBody<'a> {
    refresh_token: &'a str,
}

/// `AuthApiPort` over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, AuthApiError> {
        let response = request
            .timeout(self.timeout)
            .header(
                "User-Agent",
                format!("fittrack/{}", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .map_err(|e| AuthApiError::Transport(format!("{path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unknown error"));
            debug!(path, status = status.as_u16(), "auth api rejected request");
            return Err(AuthApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, AuthApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| AuthApiError::Transport(format!("{path}: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| AuthApiError::InvalidResponse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl AuthApiPort for HttpAuthApi {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, AuthApiError> {
        let response = self
            .send("/signup", self.client.post(self.url("/signup")).json(request))
            .await?;
        Self::parse("/signup", response).await
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, AuthApiError> {
        let response = self
            .send("/signin", self.client.post(self.url("/signin")).json(credentials))
            .await?;
        Self::parse("/signin", response).await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &BearerToken) -> Result<TokenPair, AuthApiError> {
        let body = RefreshTokenBody {
            refresh_token: refresh_token.expose(),
        };
        let response = self
            .send("/refresh", self.client.post(self.url("/refresh")).json(&body))
            .await?;
        Self::parse("/refresh", response).await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, refresh_token: &BearerToken) -> Result<(), AuthApiError> {
        let body = RefreshTokenBody {
            refresh_token: refresh_token.expose(),
        };
        self.send("/signout", self.client.post(self.url("/signout")).json(&body))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn me(&self, access_token: &BearerToken) -> Result<UserProfile, AuthApiError> {
        let response = self
            .send(
                "/me",
                self.client
                    .get(self.url("/me"))
                    .bearer_auth(access_token.expose()),
            )
            .await?;
        Self::parse("/me", response).await
    }
}
