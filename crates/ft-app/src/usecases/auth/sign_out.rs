use std::sync::Arc;

use ft_core::ports::AuthApiPort;
use tracing::{instrument, warn};

use crate::session::SessionContainer;

/// Use case for signing out on the server and locally.
///
/// The server call is best effort; the local sign-out always happens.
pub struct SignOutEverywhere {
    api: Arc<dyn AuthApiPort>,
    session: Arc<SessionContainer>,
}

impl SignOutEverywhere {
    pub fn new(api: Arc<dyn AuthApiPort>, session: Arc<SessionContainer>) -> Self {
        Self { api, session }
    }

    #[instrument(skip_all)]
    pub async fn execute(&self) -> anyhow::Result<()> {
        if let Some(refresh_token) = self.session.refresh_token() {
            if let Err(err) = self.api.sign_out(&refresh_token).await {
                warn!(error = %err, "server sign-out failed; signing out locally");
            }
        }
        self.session.sign_out().await;
        Ok(())
    }
}
