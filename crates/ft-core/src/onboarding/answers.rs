//! Partial answer records collected one field at a time during onboarding.
//!
//! Nothing here is validated; validation belongs to the form layer.

use serde::{Deserialize, Serialize};

macro_rules! merge_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if $patch.$field.is_some() {
                $target.$field = $patch.$field;
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

impl PersonalInfo {
    pub fn merge(&mut self, patch: PersonalInfo) {
        merge_fields!(self, patch, name, age, gender, height_cm, weight_kg);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitnessGoals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_workouts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
}

impl FitnessGoals {
    pub fn merge(&mut self, patch: FitnessGoals) {
        merge_fields!(
            self,
            patch,
            primary_goal,
            target_weight_kg,
            weekly_workouts,
            focus_areas
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl OnboardingPreferences {
    pub fn merge(&mut self, patch: OnboardingPreferences) {
        merge_fields!(
            self,
            patch,
            workout_duration_minutes,
            preferred_time,
            equipment,
            notifications_enabled,
            units
        );
    }
}
