//! Full runtime against on-disk storage and a mock auth backend.

use std::time::Duration;

use fittrack::bootstrap::{create_runtime, headless_router, AppRuntime};
use ft_core::config::{AppConfig, SecureBackendKind};
use ft_core::ports::Credentials;
use ft_core::RouteSegment;
use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::TempDir;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn config(data_dir: &TempDir, api: &Server) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = data_dir.path().to_path_buf();
    config.storage.secure_backend = SecureBackendKind::File;
    config.api.base_url = api.url();
    config
}

fn boot(config: &AppConfig) -> AppRuntime {
    let (navigator, routes) = headless_router();
    let mut runtime = create_runtime(config, navigator).unwrap();
    runtime.follow_routes(routes);
    runtime.start();
    runtime
}

async fn wait_for_route(runtime: &AppRuntime, segment: RouteSegment) {
    let mut rx = runtime.context().routes.subscribe();
    let reached = timeout(WAIT, rx.wait_for(|current| *current == segment))
        .await
        .map(|result| result.is_ok())
        .unwrap_or(false);
    assert!(reached, "route never reached {segment:?}");
}

#[tokio::test]
async fn onboarding_sign_in_restart_and_sign_out() {
    let data_dir = TempDir::new().unwrap();
    let mut api = Server::new_async().await;
    let sign_in = api
        .mock("POST", "/signin")
        .match_body(Matcher::PartialJson(json!({"email": "ada@example.com"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "user": {"id": "u-1", "name": "Ada", "email": "ada@example.com"},
                "accessToken": "access-1",
                "refreshToken": "refresh-1"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let sign_out = api
        .mock("POST", "/signout")
        .match_body(Matcher::Json(json!({"refreshToken": "refresh-1"})))
        .with_status(204)
        .create_async()
        .await;
    let config = config(&data_dir, &api);

    // First launch: nothing stored.
    let runtime = boot(&config);
    runtime.wait_until_ready().await;
    wait_for_route(&runtime, RouteSegment::Onboarding).await;

    let ctx = runtime.context().clone();
    ctx.session.complete_onboarding().await;
    wait_for_route(&runtime, RouteSegment::Auth).await;

    let user = ctx
        .sign_in_with_password()
        .execute(Credentials {
            email: "ada@example.com".into(),
            password: "correct horse".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.name, "Ada");
    wait_for_route(&runtime, RouteSegment::App).await;
    sign_in.assert_async().await;

    drop(ctx);
    runtime.shutdown().await.unwrap();
    assert!(data_dir.path().join("cache.json").exists());
    assert!(data_dir.path().join("keyring").is_dir());

    // Second launch: session and onboarding come back from disk.
    let runtime = boot(&config);
    runtime.wait_until_ready().await;
    let ctx = runtime.context().clone();
    assert!(ctx.session.is_authenticated());
    assert!(ctx.session.has_onboarded());
    assert_eq!(ctx.session.user().unwrap().id, "u-1");
    assert_eq!(ctx.session.refresh_token().unwrap().expose(), "refresh-1");
    assert_eq!(ctx.routes.current(), RouteSegment::App);

    ctx.sign_out_everywhere().execute().await.unwrap();
    wait_for_route(&runtime, RouteSegment::Auth).await;
    sign_out.assert_async().await;
    assert!(ctx.onboarding.is_completed());

    drop(ctx);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_sign_in_leaves_session_signed_out() {
    let data_dir = TempDir::new().unwrap();
    let mut api = Server::new_async().await;
    api.mock("POST", "/signin")
        .with_status(401)
        .with_body("invalid credentials")
        .create_async()
        .await;
    let mut config = config(&data_dir, &api);
    config.storage.secure_backend = SecureBackendKind::Memory;

    let runtime = boot(&config);
    runtime.wait_until_ready().await;
    let ctx = runtime.context().clone();

    let err = ctx
        .sign_in_with_password()
        .execute(Credentials {
            email: "ada@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("401"));
    assert!(!ctx.session.is_authenticated());
    assert!(ctx.session.user().is_none());

    drop(ctx);
    runtime.shutdown().await.unwrap();
}
