mod common;

use std::time::Duration;

use axum::{Router, routing::get};
use axum_test::TestServer;
use quota_shortener::api::handlers::redirect_handler;
use quota_shortener::application::services::USAGE_COUNTER_KEY;
use quota_shortener::domain::repositories::KeyValueStore;
use quota_shortener::state::AppState;

fn redirect_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success() {
    let ctx = common::create_test_state(&common::test_config());
    ctx.links
        .set("redirect1", "https://example.com/target", Duration::from_secs(3600))
        .await
        .unwrap();

    let server = redirect_server(ctx.state.clone());

    let response = server.get("/redirect1").await;

    assert_eq!(response.status_code(), 301);

    let location = response.header("location");
    assert_eq!(location, "https://example.com/target");

    assert_eq!(ctx.state.link_service.usage_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_counts_every_resolution() {
    let ctx = common::create_test_state(&common::test_config());
    ctx.links
        .set("abc123", "https://example.com/", Duration::from_secs(3600))
        .await
        .unwrap();

    let server = redirect_server(ctx.state.clone());

    for _ in 0..3 {
        assert_eq!(server.get("/abc123").await.status_code(), 301);
    }

    assert_eq!(
        ctx.quotas.get(USAGE_COUNTER_KEY).await.unwrap().as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn test_redirect_not_found() {
    let ctx = common::create_test_state(&common::test_config());
    let server = redirect_server(ctx.state.clone());

    let response = server.get("/zzzzzz").await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");

    assert_eq!(ctx.quotas.get(USAGE_COUNTER_KEY).await.unwrap(), None);
}
