//! # Runtime wiring / 运行时装配
//!
//! Turns an [`AppConfig`] into concrete adapters and an [`AppContext`]:
//!
//! - data root from config or the platform data dir
//! - secure storage backend per `storage.secure_backend`
//! - file-backed profile cache at `<data_root>/cache.json`
//! - system clock and the HTTP auth client
//!
//! [`AppRuntime`] owns the background tasks and stops them on shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ft_app::{AppContext, AppDeps};
use ft_core::config::AppConfig;
use ft_core::ports::NavigatorPort;
use ft_infra::{FileKeyValueCache, HttpAuthApi, SystemClock};
use ft_platform::{create_secure_storage, resolve_app_data_root};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::router::{follow_routes, RouteQueue};

pub const CACHE_FILE_NAME: &str = "cache.json";
pub const LOG_DIR_NAME: &str = "logs";

/// Resolve and create the directory that holds the cache, the file keyring
/// and the logs.
pub fn prepare_data_root(config: &AppConfig) -> anyhow::Result<PathBuf> {
    let data_root = resolve_app_data_root(&config.storage.data_dir)
        .context("Failed to resolve app data directory")?;
    std::fs::create_dir_all(&data_root)
        .with_context(|| format!("Failed to create data directory: {}", data_root.display()))?;
    Ok(data_root)
}

/// Build every adapter named by `config` and wire the containers.
pub fn create_runtime(
    config: &AppConfig,
    navigator: Arc<dyn NavigatorPort>,
) -> anyhow::Result<AppRuntime> {
    let data_root = prepare_data_root(config)?;

    let secure_storage = create_secure_storage(
        config.storage.secure_backend,
        &data_root,
        &config.storage.keyring_service,
    )
    .context("Failed to create secure storage")?;

    let cache_path = data_root.join(CACHE_FILE_NAME);
    let cache = FileKeyValueCache::open(&cache_path)
        .with_context(|| format!("Failed to open profile cache: {}", cache_path.display()))?;

    let deps = AppDeps {
        secure_storage,
        cache: Arc::new(cache),
        clock: Arc::new(SystemClock),
        navigator,
        auth_api: Arc::new(HttpAuthApi::new(config.api.base_url.as_str())),
        guard_timing: config.guard,
        hydration_timeout: config.hydration.timeout_ms.map(Duration::from_millis),
    };

    info!(
        data_root = %data_root.display(),
        backend = ?config.storage.secure_backend,
        api = %config.api.base_url,
        "runtime wired"
    );

    let (shutdown, _) = watch::channel(false);
    Ok(AppRuntime {
        context: Arc::new(AppContext::build(deps)),
        data_root,
        shutdown,
        tasks: Vec::new(),
        follower: None,
    })
}

/// Application runtime: the container graph plus its background tasks.
pub struct AppRuntime {
    context: Arc<AppContext>,
    data_root: PathBuf,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    follower: Option<JoinHandle<()>>,
}

impl AppRuntime {
    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Spawn hydration and the navigation guard.
    pub fn start(&mut self) {
        let (hydrating, guarding) = self.context.start(self.shutdown.subscribe());
        self.tasks.push(hydrating);
        self.tasks.push(guarding);
    }

    /// Feed guard redirects back as route arrivals. For runs without a UI shell.
    pub fn follow_routes(&mut self, queue: RouteQueue) {
        self.follower = Some(follow_routes(queue, self.context.routes.clone()));
    }

    pub async fn wait_until_ready(&self) {
        self.context.hydration.wait_until_ready().await;
    }

    /// Stop the guard and wait for hydration. The route follower is aborted.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let Self {
            shutdown,
            tasks,
            follower,
            ..
        } = self;

        let _ = shutdown.send(true);
        if let Some(follower) = &follower {
            follower.abort();
        }

        for task in tasks.into_iter().chain(follower) {
            match tokio::time::timeout(Duration::from_secs(5), task).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) if err.is_cancelled() => debug!("task cancelled during shutdown"),
                Ok(Err(err)) => return Err(err).context("Background task panicked"),
                Err(_) => warn!("background task did not stop within 5s"),
            }
        }
        info!("runtime stopped");
        Ok(())
    }
}
