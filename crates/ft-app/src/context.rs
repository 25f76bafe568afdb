//! # Application context / 应用上下文
//!
//! Wires the containers from their ports once per process.

use std::sync::Arc;
use std::time::Duration;

use ft_core::navigation::GuardTiming;
use ft_core::ports::{AuthApiPort, ClockPort, KeyValueCachePort, NavigatorPort, SecureStoragePort};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::guard::{GuardCoordinator, NavigationGuard, RouteTracker};
use crate::hydration::HydrationController;
use crate::onboarding::OnboardingContainer;
use crate::session::SessionContainer;
use crate::stores::{ProfileCache, SecureCredentialStore, AUTH_NAMESPACE};
use crate::usecases::{SignInWithPassword, SignOutEverywhere, SignUp};

/// Dependency grouping for [`AppContext::build`]. Not a builder: every
/// field is required.
pub struct AppDeps {
    // Storage
    pub secure_storage: Arc<dyn SecureStoragePort>,
    pub cache: Arc<dyn KeyValueCachePort>,

    // System
    pub clock: Arc<dyn ClockPort>,
    pub navigator: Arc<dyn NavigatorPort>,

    // Network
    pub auth_api: Arc<dyn AuthApiPort>,

    // Tuning
    pub guard_timing: GuardTiming,
    pub hydration_timeout: Option<Duration>,
}

/// Process-wide container graph.
pub struct AppContext {
    pub credentials: Arc<SecureCredentialStore>,
    pub profile_cache: Arc<ProfileCache>,
    pub onboarding: Arc<OnboardingContainer>,
    pub session: Arc<SessionContainer>,
    pub hydration: Arc<HydrationController>,
    pub guard: Arc<NavigationGuard>,
    pub routes: RouteTracker,
    auth_api: Arc<dyn AuthApiPort>,
}

impl AppContext {
    /// This signature is the dependency manifest.
    pub fn build(deps: AppDeps) -> Self {
        let AppDeps {
            secure_storage,
            cache,
            clock,
            navigator,
            auth_api,
            guard_timing,
            hydration_timeout,
        } = deps;

        let credentials = Arc::new(SecureCredentialStore::new(secure_storage, AUTH_NAMESPACE));
        let profile_cache = Arc::new(ProfileCache::new(cache));
        let onboarding = Arc::new(OnboardingContainer::new(profile_cache.clone(), clock.clone()));
        let session = Arc::new(SessionContainer::new(
            credentials.clone(),
            profile_cache.clone(),
            onboarding.clone(),
        ));
        let hydration = Arc::new(HydrationController::new(
            session.clone(),
            onboarding.clone(),
            hydration_timeout,
        ));
        let guard = Arc::new(NavigationGuard::new(navigator, clock, guard_timing));

        Self {
            credentials,
            profile_cache,
            onboarding,
            session,
            hydration,
            guard,
            routes: RouteTracker::default(),
            auth_api,
        }
    }

    pub fn sign_in_with_password(&self) -> SignInWithPassword {
        SignInWithPassword::new(self.auth_api.clone(), self.session.clone())
    }

    pub fn sign_up(&self) -> SignUp {
        SignUp::new(self.auth_api.clone(), self.session.clone())
    }

    pub fn sign_out_everywhere(&self) -> SignOutEverywhere {
        SignOutEverywhere::new(self.auth_api.clone(), self.session.clone())
    }

    pub fn guard_coordinator(&self) -> GuardCoordinator {
        GuardCoordinator::new(
            self.guard.clone(),
            self.session.clone(),
            self.onboarding.clone(),
            self.hydration.subscribe(),
            self.routes.clone(),
        )
    }

    /// Start hydration and the guard coordinator on the current runtime.
    ///
    /// Flip `shutdown` to `true` to stop the coordinator.
    pub fn start(&self, shutdown: watch::Receiver<bool>) -> (JoinHandle<()>, JoinHandle<()>) {
        let hydration = self.hydration.clone();
        let hydrating = tokio::spawn(async move {
            hydration.run().await;
        });
        let guarding = self.guard_coordinator().spawn(shutdown);
        (hydrating, guarding)
    }

    /// Return every container to its just-built state. Storage is untouched.
    pub fn reset(&self) {
        self.session.reset();
        self.onboarding.reset();
        self.hydration.reset();
        self.guard.reset();
    }
}
