//! FitTrack application orchestration layer
//!
//! Storage adapters, the session and onboarding containers, cold-start
//! hydration, the navigation guard runtime and the auth use cases.

pub mod context;
pub mod guard;
pub mod hydration;
pub mod onboarding;
pub mod session;
pub mod stores;
pub mod usecases;

pub use context::{AppContext, AppDeps};
pub use guard::{GuardCoordinator, GuardOutcome, NavigationGuard, RouteTracker};
pub use hydration::{HydrationController, HydrationPhase};
pub use onboarding::{OnboardingContainer, OnboardingError, OnboardingState, OnboardingStatus};
pub use session::{OnboardingCompletion, SessionContainer, SessionError};
