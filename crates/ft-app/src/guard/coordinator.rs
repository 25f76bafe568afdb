use std::sync::Arc;
use std::time::Duration;

use ft_core::navigation::GuardInput;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{GuardOutcome, NavigationGuard, RouteTracker};
use crate::hydration::HydrationPhase;
use crate::onboarding::OnboardingContainer;
use crate::session::SessionContainer;

/// Re-evaluates the guard after hydration and on every relevant change.
///
/// Listens to the session, onboarding, hydration and route channels. A
/// suppressed evaluation is retried when its window closes.
pub struct GuardCoordinator {
    guard: Arc<NavigationGuard>,
    session: Arc<SessionContainer>,
    onboarding: Arc<OnboardingContainer>,
    hydration: watch::Receiver<HydrationPhase>,
    routes: RouteTracker,
}

impl GuardCoordinator {
    pub fn new(
        guard: Arc<NavigationGuard>,
        session: Arc<SessionContainer>,
        onboarding: Arc<OnboardingContainer>,
        hydration: watch::Receiver<HydrationPhase>,
        routes: RouteTracker,
    ) -> Self {
        Self {
            guard,
            session,
            onboarding,
            hydration,
            routes,
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    fn input(&self) -> GuardInput {
        GuardInput::new(
            self.session.is_authenticated(),
            self.session.has_onboarded(),
            self.routes.current(),
        )
    }

    fn evaluate(&self) -> Option<Instant> {
        match self.guard.evaluate(self.input()) {
            GuardOutcome::Suppressed { retry_after_ms } => {
                let delay = Duration::from_millis(retry_after_ms.max(1) as u64);
                Some(Instant::now() + delay)
            }
            GuardOutcome::Stayed | GuardOutcome::Redirected(_) => None,
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        // Nothing is decided before the first paint gate opens.
        loop {
            if *self.hydration.borrow_and_update() == HydrationPhase::Ready {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => return,
                changed = self.hydration.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let mut session_rx = self.session.subscribe();
        let mut onboarding_rx = self.onboarding.subscribe();
        let mut route_rx = self.routes.subscribe();

        info!("navigation guard active");
        let mut retry_at = self.evaluate();

        loop {
            let retry = async move {
                match retry_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = shutdown.changed() => break,
                changed = session_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = onboarding_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = route_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let segment = *route_rx.borrow_and_update();
                    self.guard.route_changed(segment);
                }
                _ = retry => {}
            }

            retry_at = self.evaluate();
        }
        debug!("navigation guard stopped");
    }
}
