use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::{FitnessGoals, OnboardingPreferences, PersonalInfo};

/// Identifier of an onboarding step. Order matches the screen sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStepId {
    PersonalInfo,
    Goals,
    Preferences,
}

impl OnboardingStepId {
    pub const ALL: [OnboardingStepId; 3] = [
        OnboardingStepId::PersonalInfo,
        OnboardingStepId::Goals,
        OnboardingStepId::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStepId::PersonalInfo => "personal-info",
            OnboardingStepId::Goals => "goals",
            OnboardingStepId::Preferences => "preferences",
        }
    }
}

impl std::fmt::Display for OnboardingStepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStep {
    pub id: OnboardingStepId,
    pub completed: bool,
    pub skipped: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl OnboardingStep {
    fn new(id: OnboardingStepId) -> Self {
        Self {
            id,
            completed: false,
            skipped: false,
            timestamp: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.completed || self.skipped
    }
}

/// Write-only telemetry; never consulted by navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingAnalytics {
    pub start_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub skipped_steps: Vec<OnboardingStepId>,
    pub interaction_count: u32,
}

/// Step-by-step onboarding state, persisted as the `onboarding_progress` snapshot.
///
/// All transitions are pure; the caller supplies `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProgress {
    pub steps: Vec<OnboardingStep>,
    #[serde(default)]
    pub current_slide_index: usize,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub goals: FitnessGoals,
    #[serde(default)]
    pub preferences: OnboardingPreferences,
    #[serde(default)]
    pub is_onboarding_completed: bool,
    #[serde(default)]
    pub analytics: OnboardingAnalytics,
}

impl Default for OnboardingProgress {
    fn default() -> Self {
        Self {
            steps: OnboardingStepId::ALL
                .iter()
                .copied()
                .map(OnboardingStep::new)
                .collect(),
            current_slide_index: 0,
            personal_info: PersonalInfo::default(),
            goals: FitnessGoals::default(),
            preferences: OnboardingPreferences::default(),
            is_onboarding_completed: false,
            analytics: OnboardingAnalytics::default(),
        }
    }
}

impl OnboardingProgress {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, id: OnboardingStepId) -> Option<&OnboardingStep> {
        self.steps.iter().find(|step| step.id == id)
    }

    fn step_mut(&mut self, id: OnboardingStepId) -> &mut OnboardingStep {
        // Snapshots written by older builds may lack a step; restore it in order.
        if !self.steps.iter().any(|step| step.id == id) {
            self.steps.push(OnboardingStep::new(id));
            self.steps
                .sort_by_key(|step| OnboardingStepId::ALL.iter().position(|s| *s == step.id));
        }
        let index = self
            .steps
            .iter()
            .position(|step| step.id == id)
            .unwrap_or_default();
        &mut self.steps[index]
    }

    /// Clamp `index` into `[0, step_count - 1]` and store it.
    pub fn set_current_slide_index(&mut self, index: i64) -> usize {
        let last = self.step_count().saturating_sub(1) as i64;
        self.current_slide_index = index.clamp(0, last.max(0)) as usize;
        self.current_slide_index
    }

    pub fn next_slide(&mut self) -> usize {
        self.set_current_slide_index(self.current_slide_index as i64 + 1)
    }

    pub fn previous_slide(&mut self) -> usize {
        self.set_current_slide_index(self.current_slide_index as i64 - 1)
    }

    pub fn mark_step_completed(&mut self, id: OnboardingStepId, now: DateTime<Utc>) {
        self.touch(now);
        let step = self.step_mut(id);
        step.completed = true;
        step.skipped = false;
        step.timestamp = Some(now);
    }

    pub fn mark_step_skipped(&mut self, id: OnboardingStepId, now: DateTime<Utc>) {
        self.touch(now);
        let step = self.step_mut(id);
        step.skipped = true;
        step.completed = false;
        step.timestamp = Some(now);
        if !self.analytics.skipped_steps.contains(&id) {
            self.analytics.skipped_steps.push(id);
        }
    }

    pub fn update_personal_info(&mut self, patch: PersonalInfo, now: DateTime<Utc>) {
        self.record_interaction(now);
        self.personal_info.merge(patch);
    }

    pub fn update_goals(&mut self, patch: FitnessGoals, now: DateTime<Utc>) {
        self.record_interaction(now);
        self.goals.merge(patch);
    }

    pub fn update_preferences(&mut self, patch: OnboardingPreferences, now: DateTime<Utc>) {
        self.record_interaction(now);
        self.preferences.merge(patch);
    }

    /// Finish onboarding.
    ///
    /// Steps the user never resolved are back-filled as completed, so once the
    /// flag is set every step is completed or skipped. Calling this again keeps
    /// the original completion time.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.touch(now);
        for step in self.steps.iter_mut().filter(|step| !step.is_resolved()) {
            step.completed = true;
            step.timestamp = Some(now);
        }
        if !self.is_onboarding_completed {
            self.analytics.completion_time = Some(now);
        }
        self.is_onboarding_completed = true;
    }

    /// Whether the completion invariant holds for this snapshot.
    pub fn all_steps_resolved(&self) -> bool {
        self.steps.iter().all(OnboardingStep::is_resolved)
    }

    fn record_interaction(&mut self, now: DateTime<Utc>) {
        self.touch(now);
        self.analytics.interaction_count = self.analytics.interaction_count.saturating_add(1);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if self.analytics.start_time.is_none() {
            self.analytics.start_time = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn default_has_three_unresolved_steps_in_order() {
        let progress = OnboardingProgress::default();
        let ids: Vec<_> = progress.steps.iter().map(|s| s.id).collect();
        assert_eq!(ids, OnboardingStepId::ALL.to_vec());
        assert!(!progress.all_steps_resolved());
    }

    #[test]
    fn slide_index_is_clamped() {
        let mut progress = OnboardingProgress::default();
        assert_eq!(progress.set_current_slide_index(-5), 0);
        assert_eq!(progress.set_current_slide_index(999), 2);
        assert_eq!(progress.next_slide(), 2);
        assert_eq!(progress.previous_slide(), 1);
        assert_eq!(progress.previous_slide(), 0);
        assert_eq!(progress.previous_slide(), 0);
    }

    #[test]
    fn skipping_records_analytics_once() {
        let mut progress = OnboardingProgress::default();
        progress.mark_step_skipped(OnboardingStepId::Goals, at(1));
        progress.mark_step_skipped(OnboardingStepId::Goals, at(2));

        assert_eq!(progress.analytics.skipped_steps, vec![OnboardingStepId::Goals]);
        let step = progress.step(OnboardingStepId::Goals).unwrap();
        assert!(step.skipped);
        assert_eq!(step.timestamp, Some(at(2)));
        assert_eq!(progress.analytics.start_time, Some(at(1)));
    }

    #[test]
    fn updates_count_interactions() {
        let mut progress = OnboardingProgress::default();
        progress.update_personal_info(
            PersonalInfo {
                name: Some("Ada".into()),
                ..Default::default()
            },
            at(0),
        );
        progress.update_goals(FitnessGoals::default(), at(1));
        progress.update_preferences(OnboardingPreferences::default(), at(2));

        assert_eq!(progress.analytics.interaction_count, 3);
        assert_eq!(progress.personal_info.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn complete_back_fills_untouched_steps() {
        let mut progress = OnboardingProgress::default();
        progress.mark_step_skipped(OnboardingStepId::PersonalInfo, at(1));
        progress.complete(at(5));

        assert!(progress.is_onboarding_completed);
        assert!(progress.all_steps_resolved());
        let personal = progress.step(OnboardingStepId::PersonalInfo).unwrap();
        assert!(personal.skipped && !personal.completed);
        let goals = progress.step(OnboardingStepId::Goals).unwrap();
        assert!(goals.completed);
        assert_eq!(goals.timestamp, Some(at(5)));
        assert_eq!(progress.analytics.completion_time, Some(at(5)));
    }

    #[test]
    fn completing_twice_keeps_first_completion_time() {
        let mut progress = OnboardingProgress::default();
        progress.complete(at(5));
        progress.complete(at(9));
        assert_eq!(progress.analytics.completion_time, Some(at(5)));
    }

    #[test]
    fn snapshot_json_round_trip_uses_kebab_step_ids() {
        let mut progress = OnboardingProgress::default();
        progress.mark_step_completed(OnboardingStepId::PersonalInfo, at(0));
        let json = serde_json::to_string(&progress).unwrap();

        assert!(json.contains("\"personal-info\""));
        assert!(json.contains("\"isOnboardingCompleted\":false"));
        let restored: OnboardingProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, progress);
    }

    #[test]
    fn missing_step_in_old_snapshot_is_restored_in_order() {
        let mut progress = OnboardingProgress::default();
        progress.steps.retain(|s| s.id != OnboardingStepId::Goals);
        progress.mark_step_completed(OnboardingStepId::Goals, at(0));

        let ids: Vec<_> = progress.steps.iter().map(|s| s.id).collect();
        assert_eq!(ids, OnboardingStepId::ALL.to_vec());
    }
}
