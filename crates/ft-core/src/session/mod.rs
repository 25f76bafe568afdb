//! Session domain models
//!
//! This module defines the authenticated session held by the session
//! container: the bearer credentials, the signed-in user, and the derived
//! onboarding flag.

mod profile;
mod token;

pub use profile::{FitnessAttributes, UserProfile, UserProfilePatch};
pub use token::BearerToken;

/// Token pair and user delivered by `/signin` or `/signup`.
///
/// The access token and user always travel together, so a session can never
/// hold one without the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInPayload {
    pub access_token: BearerToken,
    pub refresh_token: Option<BearerToken>,
    pub user: UserProfile,
}

/// In-memory session state.
///
/// 会话快照：`access_token` 与 `user` 必须同时存在或同时为空。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub access_token: Option<BearerToken>,
    pub refresh_token: Option<BearerToken>,
    pub user: Option<UserProfile>,
    /// Derived from the onboarding container; never written independently.
    pub has_onboarded: bool,
    /// Set once the session has been restored from storage (or gave up).
    pub has_hydrated: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Replace credentials and user in one step.
    pub fn apply_sign_in(&mut self, payload: SignInPayload) {
        let SignInPayload {
            access_token,
            refresh_token,
            user,
        } = payload;
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
        self.user = Some(user);
    }

    /// Clear credentials and user in one step. Returns whether anything changed.
    pub fn apply_sign_out(&mut self) -> bool {
        let changed =
            self.access_token.is_some() || self.refresh_token.is_some() || self.user.is_some();
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
        changed
    }

    /// Whether the token/user pairing holds.
    pub fn is_consistent(&self) -> bool {
        self.access_token.is_some() == self.user.is_some()
    }
}
