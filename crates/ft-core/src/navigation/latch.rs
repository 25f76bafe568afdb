//! Redirect latch state machine.
//!
//! `Idle -> Navigating { until } -> Idle`. A redirect arms the latch for the
//! navigating window; while armed every evaluation is suppressed. Independently,
//! no two redirects may be issued within the debounce window, even when the
//! latch was released early because the router reported arrival.

use serde::{Deserialize, Serialize};

use super::route::{Destination, RouteSegment};

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_NAVIGATING_LATCH_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardTiming {
    pub debounce_ms: u64,
    pub navigating_latch_ms: u64,
}

impl Default for GuardTiming {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            navigating_latch_ms: DEFAULT_NAVIGATING_LATCH_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Idle,
    Navigating { destination: Destination, until_ms: i64 },
}

/// Result of asking the latch whether a redirect may be issued now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchCheck {
    Open,
    /// A redirect is in flight; retry once `until_ms` has passed.
    Navigating { until_ms: i64 },
    /// The previous redirect was too recent; retry at `until_ms`.
    Debounced { until_ms: i64 },
}

#[derive(Debug, Clone)]
pub struct GuardLatch {
    timing: GuardTiming,
    state: LatchState,
    last_redirect_ms: Option<i64>,
}

impl GuardLatch {
    pub fn new(timing: GuardTiming) -> Self {
        Self {
            timing,
            state: LatchState::Idle,
            last_redirect_ms: None,
        }
    }

    pub fn timing(&self) -> GuardTiming {
        self.timing
    }

    /// Current state after expiring an elapsed navigating window.
    pub fn poll(&mut self, now_ms: i64) -> LatchState {
        if let LatchState::Navigating { until_ms, .. } = self.state {
            if now_ms >= until_ms {
                self.state = LatchState::Idle;
            }
        }
        self.state
    }

    /// Whether evaluation may proceed at all.
    pub fn check_navigating(&mut self, now_ms: i64) -> LatchCheck {
        match self.poll(now_ms) {
            LatchState::Navigating { until_ms, .. } => LatchCheck::Navigating { until_ms },
            LatchState::Idle => LatchCheck::Open,
        }
    }

    /// Whether a new redirect may be issued.
    pub fn check_redirect(&mut self, now_ms: i64) -> LatchCheck {
        if let LatchCheck::Navigating { until_ms } = self.check_navigating(now_ms) {
            return LatchCheck::Navigating { until_ms };
        }
        match self.last_redirect_ms {
            Some(last) => {
                let until_ms = last.saturating_add(self.timing.debounce_ms as i64);
                if now_ms < until_ms {
                    LatchCheck::Debounced { until_ms }
                } else {
                    LatchCheck::Open
                }
            }
            None => LatchCheck::Open,
        }
    }

    /// Arm the latch for a redirect issued at `now_ms`.
    pub fn record_redirect(&mut self, destination: Destination, now_ms: i64) {
        self.last_redirect_ms = Some(now_ms);
        self.state = LatchState::Navigating {
            destination,
            until_ms: now_ms.saturating_add(self.timing.navigating_latch_ms as i64),
        };
    }

    /// Release the latch early when the router reports the user arrived at the
    /// pending destination. Returns whether the latch was released.
    pub fn settle(&mut self, arrived: RouteSegment) -> bool {
        match self.state {
            LatchState::Navigating { destination, .. } if destination.segment() == arrived => {
                self.state = LatchState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.state = LatchState::Idle;
        self.last_redirect_ms = None;
    }
}

impl Default for GuardLatch {
    fn default() -> Self {
        Self::new(GuardTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_arms_navigating_window() {
        let mut latch = GuardLatch::default();
        assert_eq!(latch.check_redirect(0), LatchCheck::Open);

        latch.record_redirect(Destination::Onboarding, 0);
        assert_eq!(latch.check_navigating(500), LatchCheck::Navigating { until_ms: 1_000 });
        assert_eq!(latch.check_navigating(1_000), LatchCheck::Open);
        assert_eq!(latch.poll(1_000), LatchState::Idle);
    }

    #[test]
    fn settle_releases_early_but_debounce_still_applies() {
        let mut latch = GuardLatch::default();
        latch.record_redirect(Destination::SignIn, 0);

        assert!(!latch.settle(RouteSegment::App));
        assert!(latch.settle(RouteSegment::Auth));
        assert_eq!(latch.check_navigating(20), LatchCheck::Open);
        assert_eq!(latch.check_redirect(20), LatchCheck::Debounced { until_ms: 100 });
        assert_eq!(latch.check_redirect(100), LatchCheck::Open);
    }

    #[test]
    fn reset_forgets_history() {
        let mut latch = GuardLatch::default();
        latch.record_redirect(Destination::Home, 0);
        latch.reset();
        assert_eq!(latch.check_redirect(1), LatchCheck::Open);
    }

    #[test]
    fn custom_timing_is_honoured() {
        let mut latch = GuardLatch::new(GuardTiming {
            debounce_ms: 10,
            navigating_latch_ms: 50,
        });
        latch.record_redirect(Destination::Home, 100);
        assert_eq!(latch.check_redirect(149), LatchCheck::Navigating { until_ms: 150 });
        assert_eq!(latch.check_redirect(150), LatchCheck::Open);
    }
}
