use std::path::PathBuf;

use anyhow::Context;
use fittrack::bootstrap::runtime::LOG_DIR_NAME;
use fittrack::bootstrap::{self, headless_router};
use ft_core::config::AppConfig;
use tracing::info;

/// `fittrack [CONFIG]`, falling back to `$FT_CONFIG`, then to built-in defaults.
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("FT_CONFIG"))
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match config_path() {
        Some(path) => bootstrap::load_config(path)?,
        None => AppConfig::default(),
    };

    let data_root = bootstrap::prepare_data_root(&config)?;
    bootstrap::tracing::init_tracing_subscriber(Some(&data_root.join(LOG_DIR_NAME)))
        .context("Failed to initialize tracing")?;

    let (navigator, routes) = headless_router();
    let mut runtime = bootstrap::create_runtime(&config, navigator)?;
    runtime.follow_routes(routes);
    runtime.start();
    runtime.wait_until_ready().await;

    let session = runtime.context().session.snapshot();
    info!(
        authenticated = session.is_authenticated(),
        onboarded = session.has_onboarded,
        route = ?runtime.context().routes.current(),
        "fittrack ready; press Ctrl-C to exit"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    runtime.shutdown().await
}
