//! Hydration controller
//!
//! `Hydrating -> Ready`, once per process. Both containers restore in
//! parallel; a failed or timed-out restore counts as "no prior state".

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::onboarding::OnboardingContainer;
use crate::session::SessionContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    Hydrating,
    Ready,
}

pub struct HydrationController {
    session: Arc<SessionContainer>,
    onboarding: Arc<OnboardingContainer>,
    /// Per-container bound; `None` waits for the backends indefinitely.
    timeout: Option<Duration>,
    phase: watch::Sender<HydrationPhase>,
    started: AtomicBool,
}

impl HydrationController {
    pub fn new(
        session: Arc<SessionContainer>,
        onboarding: Arc<OnboardingContainer>,
        timeout: Option<Duration>,
    ) -> Self {
        let (phase, _) = watch::channel(HydrationPhase::Hydrating);
        Self {
            session,
            onboarding,
            timeout,
            phase,
            started: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> HydrationPhase {
        *self.phase.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == HydrationPhase::Ready
    }

    pub fn subscribe(&self) -> watch::Receiver<HydrationPhase> {
        self.phase.subscribe()
    }

    /// Restore both containers, then publish `Ready`.
    ///
    /// Only the first call hydrates; later calls wait for that run to finish.
    #[instrument(skip_all)]
    pub async fn run(&self) -> HydrationPhase {
        if self.started.swap(true, Ordering::SeqCst) {
            self.wait_until_ready().await;
            return HydrationPhase::Ready;
        }

        let session = bounded(self.timeout, "session", self.session.hydrate());
        let onboarding = bounded(self.timeout, "onboarding", self.onboarding.hydrate());
        let (session_done, onboarding_done) = tokio::join!(session, onboarding);

        if !session_done {
            self.session.mark_hydrated();
        }
        if !onboarding_done {
            self.onboarding.mark_hydrated();
        }

        self.phase.send_replace(HydrationPhase::Ready);
        info!(
            authenticated = self.session.is_authenticated(),
            onboarded = self.onboarding.is_completed(),
            "hydration complete"
        );
        HydrationPhase::Ready
    }

    /// Resolve once the phase is `Ready`. This is the first-paint gate.
    pub async fn wait_until_ready(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|phase| *phase == HydrationPhase::Ready).await;
    }

    /// Back to `Hydrating` so the controller can run again. Test support.
    pub fn reset(&self) {
        self.started.store(false, Ordering::SeqCst);
        self.phase.send_replace(HydrationPhase::Hydrating);
    }
}

/// Returns `false` when the restore was cut off by the timeout.
async fn bounded(timeout: Option<Duration>, which: &'static str, restore: impl Future<Output = ()>) -> bool {
    match timeout {
        None => {
            restore.await;
            true
        }
        Some(limit) => match tokio::time::timeout(limit, restore).await {
            Ok(()) => true,
            Err(_) => {
                warn!(container = which, timeout_ms = limit.as_millis() as u64, "hydration timed out; starting without prior state");
                false
            }
        },
    }
}
