use std::sync::Arc;

use anyhow::Context;
use ft_core::ports::{AuthApiPort, Credentials};
use ft_core::{SignInPayload, UserProfile};
use tracing::instrument;

use crate::session::SessionContainer;

/// Use case for signing in with email and password.
///
/// Exchanges the credentials for a token pair and hands it to the session.
pub struct SignInWithPassword {
    api: Arc<dyn AuthApiPort>,
    session: Arc<SessionContainer>,
}

impl SignInWithPassword {
    pub fn new(api: Arc<dyn AuthApiPort>, session: Arc<SessionContainer>) -> Self {
        Self { api, session }
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn execute(&self, credentials: Credentials) -> anyhow::Result<UserProfile> {
        let response = self
            .api
            .sign_in(&credentials)
            .await
            .context("sign-in request failed")?;
        let payload = SignInPayload::from(response);
        let user = payload.user.clone();
        self.session
            .sign_in(payload)
            .await
            .context("sign-in response was not accepted")?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::auth::test_support::{ada, session, ScriptedApi};
    use crate::session::SessionError;
    use ft_core::ports::AuthApiError;

    fn credentials() -> Credentials {
        Credentials {
            email: "ada@example.com".into(),
            password: "hunter2".into(),
        }
    }

    #[tokio::test]
    async fn successful_sign_in_populates_session() {
        let session = session();
        let use_case = SignInWithPassword::new(Arc::new(ScriptedApi::default()), session.clone());

        let user = use_case.execute(credentials()).await.unwrap();

        assert_eq!(user, ada());
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().unwrap().expose(), "access-1");
        assert_eq!(session.refresh_token().unwrap().expose(), "refresh-1");
    }

    #[tokio::test]
    async fn rejected_sign_in_leaves_session_untouched() {
        let session = session();
        let api = ScriptedApi {
            reject: Some(401),
            ..Default::default()
        };
        let use_case = SignInWithPassword::new(Arc::new(api), session.clone());

        let err = use_case.execute(credentials()).await.unwrap_err();

        assert!(err
            .downcast_ref::<AuthApiError>()
            .is_some_and(AuthApiError::is_unauthorized));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn empty_access_token_fails_sign_in() {
        let session = session();
        let api = ScriptedApi {
            access_token: Some(String::new()),
            ..Default::default()
        };
        let use_case = SignInWithPassword::new(Arc::new(api), session.clone());

        let err = use_case.execute(credentials()).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<SessionError>(),
            Some(&SessionError::EmptyAccessToken)
        );
        assert!(!session.is_authenticated());
    }
}
