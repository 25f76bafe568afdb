//! Onboarding container
//!
//! Owns the onboarding progress for the device and is the single source of
//! truth for "has this device finished onboarding". Every mutation applies in
//! memory first, then writes a snapshot to the profile cache. The `*_async`
//! variants run the write on the blocking pool and report its outcome through
//! [`OnboardingStatus`]; a failed write never reverts memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ft_core::onboarding::{
    FitnessGoals, OnboardingPreferences, OnboardingProgress, OnboardingStepId, PersonalInfo,
};
use ft_core::ports::{CacheError, ClockPort};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::session::OnboardingCompletion;
use crate::stores::{keys, ProfileCache};

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("failed to persist onboarding progress: {0}")]
    Persist(#[from] CacheError),

    #[error("onboarding persistence task failed: {0}")]
    Task(String),
}

/// UI-facing status published next to the progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingStatus {
    /// An `*_async` write is in flight.
    pub is_loading: bool,
    /// Message of the last failed `*_async` write, until cleared.
    pub error: Option<String>,
    pub has_hydrated: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingState {
    pub progress: OnboardingProgress,
    pub status: OnboardingStatus,
}

pub struct OnboardingContainer {
    cache: Arc<ProfileCache>,
    clock: Arc<dyn ClockPort>,
    state: watch::Sender<OnboardingState>,
    in_flight: AtomicUsize,
}

impl OnboardingContainer {
    pub fn new(cache: Arc<ProfileCache>, clock: Arc<dyn ClockPort>) -> Self {
        let (state, _) = watch::channel(OnboardingState::default());
        Self {
            cache,
            clock,
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    // ===== observation =====

    pub fn state(&self) -> OnboardingState {
        self.state.borrow().clone()
    }

    pub fn progress(&self) -> OnboardingProgress {
        self.state.borrow().progress.clone()
    }

    pub fn status(&self) -> OnboardingStatus {
        self.state.borrow().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingState> {
        self.state.subscribe()
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().progress.is_onboarding_completed
    }

    pub fn has_hydrated(&self) -> bool {
        self.state.borrow().status.has_hydrated
    }

    // ===== synchronous operations =====

    pub fn set_current_slide_index(&self, index: i64) -> usize {
        self.mutate(|progress, _| progress.set_current_slide_index(index))
    }

    pub fn next_slide(&self) -> usize {
        self.mutate(|progress, _| progress.next_slide())
    }

    pub fn previous_slide(&self) -> usize {
        self.mutate(|progress, _| progress.previous_slide())
    }

    pub fn mark_slide_completed(&self, id: OnboardingStepId) {
        self.mutate(|progress, now| progress.mark_step_completed(id, now));
    }

    pub fn mark_slide_skipped(&self, id: OnboardingStepId) {
        self.mutate(|progress, now| progress.mark_step_skipped(id, now));
    }

    pub fn update_personal_info(&self, patch: PersonalInfo) {
        self.mutate(|progress, now| progress.update_personal_info(patch, now));
    }

    pub fn update_goals(&self, patch: FitnessGoals) {
        self.mutate(|progress, now| progress.update_goals(patch, now));
    }

    pub fn update_preferences(&self, patch: OnboardingPreferences) {
        self.mutate(|progress, now| progress.update_preferences(patch, now));
    }

    /// Mark onboarding finished, back-filling unresolved steps as completed.
    pub fn complete_onboarding(&self) {
        let first = !self.is_completed();
        self.mutate(|progress, now| progress.complete(now));
        if first {
            info!("onboarding completed");
        }
    }

    /// Back to defaults, keeping the hydration flag. Also forgets the
    /// persisted snapshot, marker and timestamps.
    pub fn reset_onboarding(&self) {
        self.apply_reset();
        if let Err(err) = forget_persisted(&self.cache) {
            warn!(error = %err, "failed to remove persisted onboarding state");
        }
    }

    // ===== asynchronous variants =====

    /// Persist the current progress, reporting the outcome in `status`.
    pub async fn save_onboarding_progress(&self) {
        let progress = self.progress();
        self.track("save", move |cache| persist_snapshot(&cache, &progress))
            .await;
    }

    pub async fn complete_onboarding_async(&self) {
        let now = self.clock.now_utc();
        let progress = self.apply(|progress| progress.complete(now));
        self.track("complete", move |cache| persist_snapshot(&cache, &progress))
            .await;
    }

    pub async fn reset_onboarding_async(&self) {
        self.apply_reset();
        self.track("reset", |cache| forget_persisted(&cache)).await;
    }

    pub async fn update_personal_info_async(&self, patch: PersonalInfo) {
        let now = self.clock.now_utc();
        let progress = self.apply(|progress| progress.update_personal_info(patch, now));
        self.track("personal_info", move |cache| {
            persist_snapshot(&cache, &progress)
        })
        .await;
    }

    pub async fn update_goals_async(&self, patch: FitnessGoals) {
        let now = self.clock.now_utc();
        let progress = self.apply(|progress| progress.update_goals(patch, now));
        self.track("goals", move |cache| persist_snapshot(&cache, &progress))
            .await;
    }

    pub async fn update_preferences_async(&self, patch: OnboardingPreferences) {
        let now = self.clock.now_utc();
        let progress = self.apply(|progress| progress.update_preferences(patch, now));
        self.track("preferences", move |cache| {
            persist_snapshot(&cache, &progress)
        })
        .await;
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.status.error.take().is_some());
    }

    // ===== hydration =====

    /// Restore progress from the cache once per process.
    ///
    /// A corrupt snapshot restores defaults. The bare completion marker and
    /// the legacy session flag are folded into the progress, and the legacy
    /// flag is removed once folded.
    #[instrument(skip_all)]
    pub async fn hydrate(&self) {
        if self.has_hydrated() {
            debug!("onboarding already hydrated");
            return;
        }

        let cache = Arc::clone(&self.cache);
        let now = self.clock.now_utc();
        let restored = tokio::task::spawn_blocking(move || restore(&cache, now)).await;
        let restored = match restored {
            Ok(progress) => progress,
            Err(err) => {
                warn!(error = %err, "onboarding restore task failed; starting fresh");
                None
            }
        };

        self.state.send_modify(|state| {
            if let Some(restored) = restored {
                merge_restored(&mut state.progress, restored, now);
            }
            state.status.has_hydrated = true;
        });
        debug!(completed = self.is_completed(), "onboarding hydrated");
    }

    /// Give up on restoring; the in-memory progress stands.
    pub fn mark_hydrated(&self) {
        self.state
            .send_if_modified(|state| !std::mem::replace(&mut state.status.has_hydrated, true));
    }

    /// Drop all in-memory state, including the hydration flag. Storage is untouched.
    ///
    /// Writes still in flight keep their slot in the loading count.
    pub fn reset(&self) {
        self.state.send_replace(OnboardingState::default());
    }

    // ===== internals =====

    /// Apply a mutation and return the resulting snapshot.
    fn apply(&self, f: impl FnOnce(&mut OnboardingProgress)) -> OnboardingProgress {
        let mut snapshot = OnboardingProgress::default();
        self.state.send_modify(|state| {
            f(&mut state.progress);
            snapshot = state.progress.clone();
        });
        snapshot
    }

    /// Apply a mutation stamped with the clock, then persist fail-open.
    fn mutate<R: Default>(&self, f: impl FnOnce(&mut OnboardingProgress, DateTime<Utc>) -> R) -> R {
        let now = self.clock.now_utc();
        let mut result = R::default();
        let snapshot = self.apply(|progress| result = f(progress, now));
        if let Err(err) = persist_snapshot(&self.cache, &snapshot) {
            warn!(error = %err, "failed to persist onboarding progress");
        }
        result
    }

    fn apply_reset(&self) {
        self.state.send_modify(|state| {
            let has_hydrated = state.status.has_hydrated;
            state.progress = OnboardingProgress::default();
            state.status.error = None;
            state.status.has_hydrated = has_hydrated;
        });
        info!("onboarding reset");
    }

    /// Run a persistence job on the blocking pool with `is_loading`/`error` bookkeeping.
    async fn track<F>(&self, op: &'static str, job: F)
    where
        F: FnOnce(Arc<ProfileCache>) -> Result<(), OnboardingError> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.status.is_loading = true;
            state.status.error = None;
        });

        let cache = Arc::clone(&self.cache);
        let result = match tokio::task::spawn_blocking(move || job(cache)).await {
            Ok(result) => result,
            Err(err) => Err(OnboardingError::Task(err.to_string())),
        };

        let remaining = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_or(0, |previous| previous - 1);
        self.state.send_modify(|state| {
            state.status.is_loading = remaining > 0;
            if let Err(err) = &result {
                state.status.error = Some(err.to_string());
            }
        });
        if let Err(err) = result {
            warn!(op, error = %err, "onboarding persistence failed");
        }
    }
}

#[async_trait]
impl OnboardingCompletion for OnboardingContainer {
    fn has_completed_onboarding(&self) -> bool {
        self.is_completed()
    }

    async fn complete_onboarding(&self) {
        self.complete_onboarding_async().await;
    }
}

fn persist_snapshot(cache: &ProfileCache, progress: &OnboardingProgress) -> Result<(), OnboardingError> {
    cache.try_set_json(keys::ONBOARDING_PROGRESS, progress)?;
    if let Some(start) = progress.analytics.start_time {
        cache.try_set_timestamp(keys::ONBOARDING_START_TIME, start)?;
    }
    if progress.is_onboarding_completed {
        cache.try_set_bool(keys::ONBOARDING_COMPLETED, true)?;
        if let Some(done) = progress.analytics.completion_time {
            cache.try_set_timestamp(keys::ONBOARDING_COMPLETION_TIME, done)?;
        }
    }
    Ok(())
}

fn forget_persisted(cache: &ProfileCache) -> Result<(), OnboardingError> {
    for key in [
        keys::ONBOARDING_PROGRESS,
        keys::ONBOARDING_COMPLETED,
        keys::ONBOARDING_START_TIME,
        keys::ONBOARDING_COMPLETION_TIME,
        keys::LEGACY_SESSION_HAS_ONBOARDED,
    ] {
        cache.try_remove(key)?;
    }
    Ok(())
}

/// Read everything persisted about onboarding. `None` means a fresh install.
fn restore(cache: &ProfileCache, now: DateTime<Utc>) -> Option<OnboardingProgress> {
    let snapshot: Option<OnboardingProgress> = cache.get_json(keys::ONBOARDING_PROGRESS);
    let marker = cache.get_bool(keys::ONBOARDING_COMPLETED).unwrap_or(false);
    let legacy = cache
        .get_bool(keys::LEGACY_SESSION_HAS_ONBOARDED)
        .unwrap_or(false);

    if snapshot.is_none() && !marker && !legacy {
        return None;
    }

    let mut progress = snapshot.unwrap_or_default();
    if progress.analytics.start_time.is_none() {
        progress.analytics.start_time = cache.get_timestamp(keys::ONBOARDING_START_TIME);
    }

    if (marker || legacy) && !progress.is_onboarding_completed {
        let completed_at = cache
            .get_timestamp(keys::ONBOARDING_COMPLETION_TIME)
            .unwrap_or(now);
        progress.complete(completed_at);
        info!(legacy, "folded persisted completion flag into onboarding progress");
        if let Err(err) = persist_snapshot(cache, &progress) {
            warn!(error = %err, "failed to persist folded onboarding progress");
        }
    }
    if legacy {
        cache.remove(keys::LEGACY_SESSION_HAS_ONBOARDED);
    }

    Some(progress)
}

/// Hydration may finish after the user already interacted. Untouched memory
/// takes the restored value; touched memory keeps its edits but never loses
/// a persisted completion.
fn merge_restored(current: &mut OnboardingProgress, restored: OnboardingProgress, now: DateTime<Utc>) {
    if *current == OnboardingProgress::default() {
        *current = restored;
    } else if restored.is_onboarding_completed && !current.is_onboarding_completed {
        current.complete(restored.analytics.completion_time.unwrap_or(now));
    }
}
