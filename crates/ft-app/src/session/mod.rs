//! Session container
//!
//! Holds `{access_token, refresh_token, user}` for the running process.
//! Memory is the source of truth; storage is best-effort durability for the
//! next cold start, so a storage failure is logged and never rolls memory
//! back. The token and the user are always swapped in a single
//! `send_modify`, so observers never see one without the other.

use std::sync::Arc;

use async_trait::async_trait;
use ft_core::{BearerToken, SessionSnapshot, SignInPayload, UserProfile, UserProfilePatch};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::stores::{
    keys, ProfileCache, SecureCredentialStore, ACCESS_TOKEN_KEY, BIOMETRIC_CREDENTIAL_KEY,
    REFRESH_TOKEN_KEY,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("sign-in payload has an empty access token")]
    EmptyAccessToken,
}

/// Owner of the onboarding completion flag.
///
/// The session never stores its own copy; it asks through this trait.
#[async_trait]
pub trait OnboardingCompletion: Send + Sync {
    fn has_completed_onboarding(&self) -> bool;

    async fn complete_onboarding(&self);
}

pub struct SessionContainer {
    credentials: Arc<SecureCredentialStore>,
    cache: Arc<ProfileCache>,
    onboarding: Arc<dyn OnboardingCompletion>,
    state: watch::Sender<SessionSnapshot>,
    /// Serializes sign-in, sign-out, profile updates and hydration so their
    /// storage writes and memory swaps cannot interleave.
    op_lock: Mutex<()>,
}

impl SessionContainer {
    pub fn new(
        credentials: Arc<SecureCredentialStore>,
        cache: Arc<ProfileCache>,
        onboarding: Arc<dyn OnboardingCompletion>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            credentials,
            cache,
            onboarding,
            state,
            op_lock: Mutex::new(()),
        }
    }

    // ===== observation =====

    /// Current state with `has_onboarded` read live from the onboarding owner.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = self.state.borrow().clone();
        snapshot.has_onboarded = self.has_onboarded();
        snapshot
    }

    /// Published on every session mutation. `has_onboarded` in the published
    /// value is as of that mutation; watch the onboarding container for
    /// completion changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn access_token(&self) -> Option<BearerToken> {
        self.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<BearerToken> {
        self.state.borrow().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn has_onboarded(&self) -> bool {
        self.onboarding.has_completed_onboarding()
    }

    pub fn has_hydrated(&self) -> bool {
        self.state.borrow().has_hydrated
    }

    // ===== operations =====

    /// Persist the credentials and profile, then swap them into memory together.
    ///
    /// Storage failures are logged and do not fail the call; only an unusable
    /// payload does, and then nothing is written.
    #[instrument(skip_all, fields(user_id = %payload.user.id))]
    pub async fn sign_in(&self, payload: SignInPayload) -> Result<(), SessionError> {
        if payload.access_token.is_empty() {
            warn!("sign-in rejected: empty access token");
            return Err(SessionError::EmptyAccessToken);
        }
        let _guard = self.op_lock.lock().await;

        if !self
            .credentials
            .set(ACCESS_TOKEN_KEY, payload.access_token.expose())
            .await
        {
            warn!("access token not persisted; session will not survive a restart");
        }
        match &payload.refresh_token {
            Some(token) => {
                self.credentials.set(REFRESH_TOKEN_KEY, token.expose()).await;
            }
            None => {
                self.credentials.remove(REFRESH_TOKEN_KEY).await;
            }
        }
        self.cache.set_json(keys::USER_PROFILE, &payload.user);
        self.cache.set_user_namespace(Some(&payload.user.id));

        let has_onboarded = self.has_onboarded();
        self.state.send_modify(|state| {
            state.apply_sign_in(payload);
            state.has_onboarded = has_onboarded;
        });
        info!("signed in");
        Ok(())
    }

    /// Forget credentials, the cached profile and the user's cache scope.
    ///
    /// Idempotent: storage removal always runs, and signing out an empty
    /// session publishes nothing.
    #[instrument(skip_all)]
    pub async fn sign_out(&self) {
        let _guard = self.op_lock.lock().await;

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, BIOMETRIC_CREDENTIAL_KEY] {
            self.credentials.remove(key).await;
        }
        self.cache.remove(keys::USER_PROFILE);
        self.cache.clear();
        self.cache.set_user_namespace(None);

        let changed = self.state.send_if_modified(SessionSnapshot::apply_sign_out);
        if changed {
            info!("signed out");
        } else {
            debug!("sign-out on an empty session");
        }
    }

    /// Shallow-merge `patch` into the signed-in user.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, patch: UserProfilePatch) {
        let _guard = self.op_lock.lock().await;

        let Some(mut user) = self.user() else {
            debug!("update_profile without a signed-in user");
            return;
        };
        if patch.is_empty() {
            return;
        }
        patch.apply_to(&mut user);
        self.cache.set_json(keys::USER_PROFILE, &user);
        self.state.send_modify(|state| state.user = Some(user));
    }

    /// Complete onboarding through its owner. Tokens are untouched.
    pub async fn complete_onboarding(&self) {
        self.onboarding.complete_onboarding().await;
        let has_onboarded = self.has_onboarded();
        self.state
            .send_if_modified(|state| std::mem::replace(&mut state.has_onboarded, has_onboarded) != has_onboarded);
    }

    /// Restore the session from storage once per process.
    ///
    /// Only a complete pair (token and profile) is restored. A half whose
    /// partner is confirmed absent is removed; when either read fails the
    /// session starts signed out and storage is left for the next boot.
    #[instrument(skip_all)]
    pub async fn hydrate(&self) {
        let _guard = self.op_lock.lock().await;
        if self.has_hydrated() {
            debug!("session already hydrated");
            return;
        }

        let access = self
            .credentials
            .try_get(ACCESS_TOKEN_KEY)
            .await
            .map(|token| token.filter(|token| !token.is_empty()));
        let user = self
            .cache
            .try_get_string(keys::USER_PROFILE)
            .map(|raw| raw.and_then(|raw| parse_profile(&raw)));

        let restored = match (access, user) {
            (Ok(Some(access)), Ok(Some(user))) => Some(SignInPayload {
                access_token: BearerToken::new(access),
                refresh_token: self.credentials.get(REFRESH_TOKEN_KEY).await.map(BearerToken::new),
                user,
            }),
            (Ok(Some(_)), Ok(None)) => {
                warn!("stored token has no cached profile; discarding credentials");
                self.credentials.remove(ACCESS_TOKEN_KEY).await;
                self.credentials.remove(REFRESH_TOKEN_KEY).await;
                None
            }
            (Ok(None), Ok(Some(_))) => {
                warn!("cached profile has no stored token; discarding profile");
                self.cache.remove(keys::USER_PROFILE);
                None
            }
            (Ok(None), Ok(None)) => None,
            (access, user) => {
                if let Err(err) = &access {
                    warn!(error = %err, "secure storage unreadable; starting signed out");
                }
                if let Err(err) = &user {
                    warn!(error = %err, "profile cache unreadable; starting signed out");
                }
                None
            }
        };

        if let Some(payload) = &restored {
            self.cache.set_user_namespace(Some(&payload.user.id));
        }

        let has_onboarded = self.has_onboarded();
        self.state.send_modify(|state| {
            // A sign-in that completed first wins over stored state.
            if let (Some(payload), false) = (restored, state.is_authenticated()) {
                state.apply_sign_in(payload);
            }
            state.has_onboarded = has_onboarded;
            state.has_hydrated = true;
        });
        debug!(authenticated = self.is_authenticated(), "session hydrated");
    }

    /// Give up on restoring; the session stays as it is.
    pub fn mark_hydrated(&self) {
        self.state
            .send_if_modified(|state| !std::mem::replace(&mut state.has_hydrated, true));
    }

    // ===== biometric unlock =====

    pub async fn set_biometric_credential(&self, blob: &str) -> bool {
        self.credentials.set(BIOMETRIC_CREDENTIAL_KEY, blob).await
    }

    pub async fn biometric_credential(&self) -> Option<String> {
        self.credentials.get(BIOMETRIC_CREDENTIAL_KEY).await
    }

    pub async fn clear_biometric_credential(&self) {
        self.credentials.remove(BIOMETRIC_CREDENTIAL_KEY).await;
    }

    /// Drop in-memory state, including the hydration flag. Storage is untouched.
    pub fn reset(&self) {
        self.cache.set_user_namespace(None);
        self.state.send_replace(SessionSnapshot::default());
    }
}

/// An unparseable profile counts as absent.
fn parse_profile(raw: &str) -> Option<UserProfile> {
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "cached profile is not valid JSON");
            None
        }
    }
}
