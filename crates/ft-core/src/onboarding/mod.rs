//! Onboarding domain models
//!
//! This module defines the core domain models for the onboarding flow: the
//! ordered set of steps, the answers collected along the way, and the
//! completion flag that gates navigation.

mod answers;
mod progress;

pub use answers::{FitnessGoals, OnboardingPreferences, PersonalInfo};
pub use progress::{OnboardingAnalytics, OnboardingProgress, OnboardingStep, OnboardingStepId};
