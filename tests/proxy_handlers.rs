//! End-to-end tests for the resource proxy.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

use focal_gateway::resilience::{ManualCancellation, TimerCancellation};

mod common;

#[tokio::test]
async fn test_disallowed_method_is_405_without_backend_call() {
    let (backend, recorder) = common::start_mock_backend("{}").await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;
    let client = common::client();

    for (method, path) in [
        (reqwest::Method::GET, "/api/photo"),
        (reqwest::Method::PATCH, "/api/edit/3"),
        (reqwest::Method::GET, "/api/manufacturer"),
    ] {
        let res = client
            .request(method, format!("http://{}{}", proxy, path))
            .send()
            .await
            .expect("Gateway unreachable");
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.text().await.unwrap(), "");
    }
    assert_eq!(recorder.calls(), 0, "Rejected methods must not reach the backend");

    shutdown.trigger();
}

#[tokio::test]
async fn test_method_must_match_collection_or_item_path() {
    let (backend, recorder) = common::start_mock_backend("{}").await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;
    let client = common::client();

    for (method, path, allow) in [
        (reqwest::Method::POST, "/api/upvote", "PUT"),
        (reqwest::Method::PUT, "/api/photo/42", "POST, DELETE"),
        (reqwest::Method::DELETE, "/api/camera", "PUT"),
        (reqwest::Method::POST, "/api/upvote/9", "DELETE"),
    ] {
        let res = client
            .request(method.clone(), format!("http://{}{}", proxy, path))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, path);
        assert_eq!(res.headers()["allow"], allow);
    }
    assert_eq!(recorder.calls(), 0);

    for (method, path) in [
        (reqwest::Method::PUT, "/api/upvote"),
        (reqwest::Method::POST, "/api/photo/42"),
        (reqwest::Method::DELETE, "/api/upvote/9"),
    ] {
        let res = client
            .request(method.clone(), format!("http://{}{}", proxy, path))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{} {}", method, path);
    }
    let targets: Vec<_> = recorder.requests().into_iter().map(|r| (r.method, r.target)).collect();
    assert_eq!(
        targets,
        vec![
            ("PUT".to_string(), "/upvote".to_string()),
            ("POST".to_string(), "/photo/42".to_string()),
            ("DELETE".to_string(), "/upvote/9".to_string()),
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_success_relays_status_and_body() {
    let (backend, recorder) =
        common::start_programmable_backend(|_| async { (201, r#"{"photoId": 42}"#.to_string()) }).await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;

    let form = reqwest::multipart::Form::new()
        .text("photo_title", "Sunset")
        .part("raw_file", reqwest::multipart::Part::bytes(vec![1, 2, 3]).file_name("sunset.cr3"));
    let res = common::client()
        .put(format!("http://{}/api/photo", proxy))
        .header("Cookie", "token=dG9rOmFAYi5j")
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["photoId"], 42);

    let seen = &recorder.requests()[0];
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.target, "/photo");
    assert_eq!(seen.header("authorization"), Some("Basic dG9rOmFAYi5j"));
    assert!(seen.header("content-type").unwrap().starts_with("multipart/form-data"));
    assert!(seen.header("x-request-id").is_some());
    assert!(seen.header("cookie").is_none());
    assert!(seen.body_text().contains("Sunset"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_nested_path_and_query_are_forwarded() {
    let (backend, recorder) = common::start_mock_backend("{}").await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;

    let res = common::client()
        .delete(format!("http://{}/api/reply/7?soft=1", proxy))
        .json(&serde_json::json!({ "reason": "spam" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let seen = &recorder.requests()[0];
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.target, "/reply/7?soft=1");
    assert_eq!(seen.json()["reason"], "spam");
    assert!(seen.header("authorization").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_rejection_drops_body() {
    let (backend, _) = common::start_programmable_backend(|_| async {
        (400, r#"{"detail": "internal validation message"}"#.to_string())
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;

    let res = common::client()
        .put(format!("http://{}/api/upvote", proxy))
        .json(&serde_json::json!({ "photo_id": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "");

    shutdown.trigger();
}

#[tokio::test]
async fn test_timeout_is_503_and_leaves_no_timer() {
    let (backend, recorder) = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, "{}".to_string())
    })
    .await;
    let mut config = common::config_for(backend);
    config.timeouts.request_ms = 200;

    let timers = Arc::new(TimerCancellation::new());
    let (proxy, shutdown) = common::start_gateway_with(config, timers.clone()).await;

    let started = std::time::Instant::now();
    let res = common::client()
        .put(format!("http://{}/api/tag", proxy))
        .json(&serde_json::json!({ "tag": "sunset" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "");
    assert!(started.elapsed() < Duration::from_secs(2), "Deadline was not enforced");
    assert_eq!(recorder.calls(), 1);
    assert_eq!(timers.armed(), 0, "Timer must be released once the request settles");

    shutdown.trigger();
}

#[tokio::test]
async fn test_stalled_backend_body_is_503() {
    let (backend, recorder) = common::start_stalling_backend(Duration::from_secs(5)).await;
    let mut config = common::config_for(backend);
    config.timeouts.request_ms = 200;

    let timers = Arc::new(TimerCancellation::new());
    let (proxy, shutdown) = common::start_gateway_with(config, timers.clone()).await;

    let started = std::time::Instant::now();
    let res = tokio::time::timeout(
        Duration::from_secs(3),
        common::client()
            .put(format!("http://{}/api/photo", proxy))
            .json(&serde_json::json!({ "photo_title": "Sunset" }))
            .send(),
    )
    .await
    .expect("Gateway kept waiting on the backend body")
    .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "");
    assert!(started.elapsed() < Duration::from_secs(2), "Deadline must cover the backend body");
    assert_eq!(recorder.calls(), 1);
    assert_eq!(timers.armed(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_completed_request_releases_timer() {
    let (backend, _) = common::start_mock_backend("{}").await;
    let timers = Arc::new(TimerCancellation::new());
    let (proxy, shutdown) = common::start_gateway_with(common::config_for(backend), timers.clone()).await;

    let res = common::client()
        .put(format!("http://{}/api/camera", proxy))
        .json(&serde_json::json!({ "model": "Z6" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(timers.armed(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_manual_abort_is_503() {
    let (backend, _) = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        (200, "{}".to_string())
    })
    .await;
    let cancellation = Arc::new(ManualCancellation::new());
    let (proxy, shutdown) = common::start_gateway_with(common::config_for(backend), cancellation.clone()).await;

    let pending = tokio::spawn(
        common::client()
            .put(format!("http://{}/api/editor", proxy))
            .json(&serde_json::json!({ "name": "Darktable" }))
            .send(),
    );
    while cancellation.armed() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cancellation.abort_all();

    let res = pending.await.unwrap().unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(cancellation.armed(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_is_503() {
    let mut config = common::config_for("127.0.0.1:1".parse().unwrap());
    config.timeouts.request_ms = 2000;
    let (proxy, shutdown) = common::start_gateway(config).await;

    let res = common::client()
        .put(format!("http://{}/api/lens", proxy))
        .json(&serde_json::json!({ "model": "50mm" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "");

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let (backend, recorder) = common::start_mock_backend("{}").await;
    let mut config = common::config_for(backend);
    config.limits.max_body_bytes = 64;
    let (proxy, shutdown) = common::start_gateway(config).await;

    let res = common::client()
        .put(format!("http://{}/api/preview", proxy))
        .body(vec![b'x'; 4096])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(recorder.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_resource_is_404() {
    let (backend, recorder) = common::start_mock_backend("{}").await;
    let (proxy, shutdown) = common::start_gateway(common::config_for(backend)).await;

    let res = common::client()
        .post(format!("http://{}/api/graphql", proxy))
        .json(&serde_json::json!({ "query": "{ accounts { id } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(recorder.calls(), 0);

    shutdown.trigger();
}
