//! Session and onboarding invariants under storage failures.

use std::sync::{Arc, Mutex};

use ft_app::onboarding::OnboardingContainer;
use ft_app::session::SessionContainer;
use ft_app::stores::{ProfileCache, SecureCredentialStore, AUTH_NAMESPACE};
use ft_core::onboarding::{FitnessGoals, OnboardingStepId, PersonalInfo};
use ft_core::ports::{CacheError, ClockPort, KeyValueCachePort, SecureStorageError, SecureStoragePort};
use ft_core::{BearerToken, SignInPayload, UserProfile};
use ft_infra::{FileKeyValueCache, InMemoryKeyValueCache, SystemClock};
use ft_platform::FileSecureStorage;
use mockall::mock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Mocks
// ============================================================================

mock! {
    pub Keychain {}

    impl SecureStoragePort for Keychain {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SecureStorageError>;
        fn set(&self, key: &str, value: &[u8]) -> Result<(), SecureStorageError>;
        fn delete(&self, key: &str) -> Result<(), SecureStorageError>;
    }
}

mock! {
    pub Cache {}

    impl KeyValueCachePort for Cache {
        fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
        fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
        fn remove(&self, key: &str) -> Result<(), CacheError>;
        fn keys(&self) -> Result<Vec<String>, CacheError>;
        fn clear(&self) -> Result<(), CacheError>;
    }
}

/// Keychain that fails each write with probability `rate`, driven by a seeded rng.
fn flaky_keychain(rng: Arc<Mutex<StdRng>>, rate: f64) -> MockKeychain {
    let mut keychain = MockKeychain::new();
    keychain.expect_get().returning(|_| Ok(None));
    let set_rng = rng.clone();
    keychain.expect_set().returning(move |_, _| {
        if set_rng.lock().unwrap().gen_bool(rate) {
            Err(SecureStorageError::Unavailable("injected".into()))
        } else {
            Ok(())
        }
    });
    keychain.expect_delete().returning(move |_| {
        if rng.lock().unwrap().gen_bool(rate) {
            Err(SecureStorageError::PermissionDenied("injected".into()))
        } else {
            Ok(())
        }
    });
    keychain
}

fn flaky_cache(rng: Arc<Mutex<StdRng>>, rate: f64) -> MockCache {
    let mut cache = MockCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_keys().returning(|| Ok(Vec::new()));
    let set_rng = rng.clone();
    cache.expect_set().returning(move |_, _| {
        if set_rng.lock().unwrap().gen_bool(rate) {
            Err(CacheError::Io("injected".into()))
        } else {
            Ok(())
        }
    });
    let remove_rng = rng.clone();
    cache.expect_remove().returning(move |_| {
        if remove_rng.lock().unwrap().gen_bool(rate) {
            Err(CacheError::Io("injected".into()))
        } else {
            Ok(())
        }
    });
    cache.expect_clear().returning(move || {
        if rng.lock().unwrap().gen_bool(rate) {
            Err(CacheError::Io("injected".into()))
        } else {
            Ok(())
        }
    });
    cache
}

// ============================================================================
// Helpers
// ============================================================================

fn user(id: &str) -> UserProfile {
    UserProfile {
        id: id.into(),
        name: format!("user {id}"),
        email: format!("{id}@example.com"),
        avatar_url: None,
        fitness: Default::default(),
    }
}

fn payload(token: &str, id: &str) -> SignInPayload {
    SignInPayload {
        access_token: BearerToken::new(token),
        refresh_token: Some(BearerToken::new(format!("{token}-refresh"))),
        user: user(id),
    }
}

fn containers(
    secure: Arc<dyn SecureStoragePort>,
    cache: Arc<dyn KeyValueCachePort>,
    clock: Arc<dyn ClockPort>,
) -> (Arc<OnboardingContainer>, Arc<SessionContainer>) {
    let profile_cache = Arc::new(ProfileCache::new(cache));
    let onboarding = Arc::new(OnboardingContainer::new(profile_cache.clone(), clock));
    let session = Arc::new(SessionContainer::new(
        Arc::new(SecureCredentialStore::new(secure, AUTH_NAMESPACE)),
        profile_cache,
        onboarding.clone(),
    ));
    (onboarding, session)
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn token_and_user_never_diverge_under_random_failures() {
    for seed in 0..16u64 {
        let rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        let (_, session) = containers(
            Arc::new(flaky_keychain(rng.clone(), 0.5)),
            Arc::new(flaky_cache(rng.clone(), 0.5)),
            Arc::new(SystemClock),
        );
        let mut rx = session.subscribe();
        let mut ops = StdRng::seed_from_u64(seed.wrapping_mul(31));

        for step in 0..40 {
            let signing_in = ops.gen_bool(0.6);
            if signing_in {
                session
                    .sign_in(payload(&format!("t-{seed}-{step}"), &format!("u-{step}")))
                    .await
                    .unwrap();
            } else {
                session.sign_out().await;
            }

            let snapshot = session.snapshot();
            assert!(snapshot.is_consistent(), "seed {seed} step {step}: {snapshot:?}");
            assert_eq!(snapshot.is_authenticated(), signing_in, "seed {seed} step {step}");
            assert!(rx.borrow_and_update().is_consistent());
        }
    }
}

#[tokio::test]
async fn sign_out_twice_equals_sign_out_once() {
    let (_, session) = containers(
        Arc::new(flaky_keychain(Arc::new(Mutex::new(StdRng::seed_from_u64(7))), 0.3)),
        Arc::new(InMemoryKeyValueCache::new()),
        Arc::new(SystemClock),
    );
    session.sign_in(payload("a", "u-1")).await.unwrap();

    session.sign_out().await;
    let once = session.snapshot();
    session.sign_out().await;
    let twice = session.snapshot();

    assert_eq!(once, twice);
    assert!(!twice.is_authenticated());
}

#[tokio::test]
async fn completion_only_reverts_through_reset() {
    let rng = Arc::new(Mutex::new(StdRng::seed_from_u64(42)));
    let (onboarding, session) = containers(
        Arc::new(flaky_keychain(rng.clone(), 0.3)),
        Arc::new(flaky_cache(rng, 0.4)),
        Arc::new(SystemClock),
    );
    session.complete_onboarding().await;
    assert!(onboarding.is_completed());

    let mut ops = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        match ops.gen_range(0..10) {
            0 => {
                onboarding.set_current_slide_index(ops.gen_range(-10..10));
            }
            1 => onboarding.mark_slide_skipped(OnboardingStepId::ALL[ops.gen_range(0..3)]),
            2 => onboarding.mark_slide_completed(OnboardingStepId::ALL[ops.gen_range(0..3)]),
            3 => {
                onboarding
                    .update_goals_async(FitnessGoals {
                        weekly_workouts: Some(ops.gen_range(1..7)),
                        ..Default::default()
                    })
                    .await
            }
            4 => onboarding.update_personal_info(PersonalInfo {
                age: Some(ops.gen_range(18..80)),
                ..Default::default()
            }),
            5 => onboarding.save_onboarding_progress().await,
            6 => onboarding.complete_onboarding_async().await,
            7 => session.sign_in(payload("a", "u-1")).await.unwrap(),
            8 => session.sign_out().await,
            _ => onboarding.hydrate().await,
        }
        assert!(onboarding.is_completed());
        assert!(session.has_onboarded());
        assert!(onboarding.progress().all_steps_resolved());
    }

    onboarding.reset_onboarding();
    assert!(!onboarding.is_completed());
    assert!(!session.has_onboarded());
}

#[tokio::test]
async fn session_survives_restart_on_disk_backends() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("cache.json");
    let clock = Arc::new(SystemClock);

    {
        let secure = Arc::new(FileSecureStorage::new_in_app_data_root(dir.path()).unwrap());
        let cache = Arc::new(FileKeyValueCache::open(&cache_path).unwrap());
        let (onboarding, session) = containers(secure, cache, clock.clone());
        onboarding.complete_onboarding();
        session.sign_in(payload("a", "u-1")).await.unwrap();
    }

    let secure = Arc::new(FileSecureStorage::new_in_app_data_root(dir.path()).unwrap());
    let cache = Arc::new(FileKeyValueCache::open(&cache_path).unwrap());
    let (onboarding, session) = containers(secure, cache, clock);
    assert!(!session.is_authenticated());

    tokio::join!(session.hydrate(), onboarding.hydrate());

    assert_eq!(session.access_token().unwrap().expose(), "a");
    assert_eq!(session.refresh_token().unwrap().expose(), "a-refresh");
    assert_eq!(session.user(), Some(user("u-1")));
    assert!(session.has_onboarded());
}
