//! Navigation guard runtime
//!
//! Wraps the pure decision table with the redirect latch and drives the
//! router. [`GuardCoordinator`] feeds it from the container channels.

mod coordinator;

use std::sync::{Arc, Mutex, PoisonError};

use ft_core::navigation::{
    decide, Destination, GuardDecision, GuardInput, GuardLatch, GuardTiming, LatchCheck,
    LatchState, RouteSegment,
};
use ft_core::ports::{ClockPort, NavigatorPort};
use tokio::sync::watch;
use tracing::{debug, info, trace};

pub use coordinator::GuardCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Stayed,
    Redirected(Destination),
    /// Evaluation was latched or debounced; try again after `retry_after_ms`.
    Suppressed { retry_after_ms: i64 },
}

pub struct NavigationGuard {
    navigator: Arc<dyn NavigatorPort>,
    clock: Arc<dyn ClockPort>,
    latch: Mutex<GuardLatch>,
}

impl NavigationGuard {
    pub fn new(
        navigator: Arc<dyn NavigatorPort>,
        clock: Arc<dyn ClockPort>,
        timing: GuardTiming,
    ) -> Self {
        Self {
            navigator,
            clock,
            latch: Mutex::new(GuardLatch::new(timing)),
        }
    }

    fn latch(&self) -> std::sync::MutexGuard<'_, GuardLatch> {
        self.latch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide and, when a redirect is due and allowed, navigate exactly once.
    pub fn evaluate(&self, input: GuardInput) -> GuardOutcome {
        let now = self.clock.now_ms();
        let mut latch = self.latch();

        if let LatchCheck::Navigating { until_ms } = latch.check_navigating(now) {
            trace!(?input, "guard latched; evaluation suppressed");
            return GuardOutcome::Suppressed {
                retry_after_ms: until_ms - now,
            };
        }

        let destination = match decide(input) {
            GuardDecision::Stay => return GuardOutcome::Stayed,
            GuardDecision::Goto(destination) => destination,
        };

        match latch.check_redirect(now) {
            LatchCheck::Open => {
                latch.record_redirect(destination, now);
                drop(latch);
                info!(?input, %destination, "guard redirect");
                self.navigator.navigate(destination);
                GuardOutcome::Redirected(destination)
            }
            LatchCheck::Navigating { until_ms } | LatchCheck::Debounced { until_ms } => {
                debug!(%destination, retry_in_ms = until_ms - now, "guard redirect debounced");
                GuardOutcome::Suppressed {
                    retry_after_ms: until_ms - now,
                }
            }
        }
    }

    /// The router reports where the user is now. Releases the latch early on
    /// arrival at the pending destination.
    pub fn route_changed(&self, segment: RouteSegment) -> bool {
        let released = self.latch().settle(segment);
        if released {
            trace!(?segment, "guard latch released on arrival");
        }
        released
    }

    pub fn latch_state(&self) -> LatchState {
        let now = self.clock.now_ms();
        self.latch().poll(now)
    }

    pub fn timing(&self) -> GuardTiming {
        self.latch().timing()
    }

    pub fn reset(&self) {
        self.latch().reset();
    }
}

/// Current route segment, reported by the UI shell.
#[derive(Clone)]
pub struct RouteTracker {
    segment: Arc<watch::Sender<RouteSegment>>,
}

impl RouteTracker {
    pub fn new(initial: RouteSegment) -> Self {
        let (segment, _) = watch::channel(initial);
        Self {
            segment: Arc::new(segment),
        }
    }

    /// Record a navigation to `path`. Publishes only when the segment changes.
    pub fn report(&self, path: &str) -> RouteSegment {
        let segment = RouteSegment::from_path(path);
        self.segment
            .send_if_modified(|current| std::mem::replace(current, segment) != segment);
        segment
    }

    pub fn current(&self) -> RouteSegment {
        *self.segment.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RouteSegment> {
        self.segment.subscribe()
    }
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::new(RouteSegment::App)
    }
}
