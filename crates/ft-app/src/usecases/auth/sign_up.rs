use std::sync::Arc;

use anyhow::Context;
use ft_core::ports::{AuthApiPort, SignUpRequest};
use ft_core::{SignInPayload, UserProfile};
use tracing::instrument;

use crate::session::SessionContainer;

/// Use case for creating an account; a successful sign-up is signed in.
pub struct SignUp {
    api: Arc<dyn AuthApiPort>,
    session: Arc<SessionContainer>,
}

impl SignUp {
    pub fn new(api: Arc<dyn AuthApiPort>, session: Arc<SessionContainer>) -> Self {
        Self { api, session }
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn execute(&self, request: SignUpRequest) -> anyhow::Result<UserProfile> {
        let response = self
            .api
            .sign_up(&request)
            .await
            .context("sign-up request failed")?;
        let payload = SignInPayload::from(response);
        let user = payload.user.clone();
        self.session
            .sign_in(payload)
            .await
            .context("sign-up response was not accepted")?;
        Ok(user)
    }
}
