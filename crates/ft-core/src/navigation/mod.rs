//! Navigation gating
//!
//! Route classification, the pure guard decision, and the redirect latch that
//! keeps the guard from issuing redirect storms.

mod decision;
mod latch;
mod route;

pub use decision::{decide, GuardDecision, GuardInput};
pub use latch::{
    GuardLatch, GuardTiming, LatchCheck, LatchState, DEFAULT_DEBOUNCE_MS,
    DEFAULT_NAVIGATING_LATCH_MS,
};
pub use route::{Destination, RouteSegment};
