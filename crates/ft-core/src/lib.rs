//! # ft-core
//!
//! Core domain models and business logic for the FitTrack session and
//! onboarding layer.
//!
//! This crate contains pure logic without any infrastructure dependencies.

pub mod config;
pub mod navigation;
pub mod onboarding;
pub mod ports;
pub mod profile;
pub mod session;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use navigation::{decide, Destination, GuardDecision, GuardInput, RouteSegment};
pub use onboarding::{OnboardingProgress, OnboardingStepId};
pub use session::{BearerToken, SessionSnapshot, SignInPayload, UserProfile, UserProfilePatch};
