// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use reviewrs::config::settings::Settings;
use reviewrs::domain::services::crawl_service::{CrawlOptions, CrawlService};
use reviewrs::domain::services::selector_oracle::HeuristicSelectorOracle;
use reviewrs::presentation::routes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use super::helpers::ScriptedLauncher;

fn test_app(launcher: &ScriptedLauncher) -> Router {
    let settings = Settings::from_defaults().unwrap();
    let service = CrawlService::new(
        Arc::new(launcher.clone()),
        Arc::new(HeuristicSelectorOracle),
        CrawlOptions {
            settle_delay: Duration::ZERO,
            body_wait_timeout: Duration::from_secs(1),
        },
    );
    routes::app(Arc::new(service), settings.crawl)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// 健康检查测试
#[tokio::test]
async fn health_check_works() {
    let response = routes::routes()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let response = routes::routes()
        .oneshot(Request::builder().uri("/v1/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], env!("CARGO_PKG_VERSION").as_bytes());
}

#[tokio::test]
async fn reviews_endpoint_returns_all_pages() {
    let launcher = ScriptedLauncher::two_page_shop();
    let (status, body) = get(
        test_app(&launcher),
        "/api/reviews?url=https%3A%2F%2Fshop.test%2Fproduct&max_pages=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews_count"], 5);
    assert_eq!(body["pages_processed"], 2);
    assert_eq!(body["reviews"][0]["title"], "Great fit");
    assert_eq!(body["reviews"][0]["rating"], 5);
    assert_eq!(body["reviews"][1]["date"], Value::Null);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn reviews_endpoint_uses_default_page_limit() {
    let launcher = ScriptedLauncher::two_page_shop();
    let (status, body) = get(
        test_app(&launcher),
        "/api/reviews?url=https%3A%2F%2Fshop.test%2Fproduct",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pages_processed"], 2);
}

#[tokio::test]
async fn reviews_endpoint_rejects_invalid_url() {
    let launcher = ScriptedLauncher::two_page_shop();
    let (status, body) = get(test_app(&launcher), "/api/reviews?url=not-a-url").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn reviews_endpoint_rejects_non_http_scheme() {
    let launcher = ScriptedLauncher::two_page_shop();
    let (status, _) = get(
        test_app(&launcher),
        "/api/reviews?url=ftp%3A%2F%2Fshop.test%2Ffile",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn reviews_endpoint_rejects_out_of_range_pages() {
    for max_pages in [0, 51] {
        let launcher = ScriptedLauncher::two_page_shop();
        let uri = format!(
            "/api/reviews?url=https%3A%2F%2Fshop.test%2Fproduct&max_pages={}",
            max_pages
        );
        let (status, body) = get(test_app(&launcher), &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "max_pages={}", max_pages);
        assert!(body["error"].as_str().unwrap().contains("max_pages"));
        assert_eq!(launcher.launches(), 0);
    }
}

#[tokio::test]
async fn reviews_endpoint_requires_url() {
    let launcher = ScriptedLauncher::two_page_shop();
    let (status, _) = get(test_app(&launcher), "/api/reviews").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviews_endpoint_reports_browser_failure() {
    let launcher = ScriptedLauncher::failing();
    let (status, body) = get(
        test_app(&launcher),
        "/api/reviews?url=https%3A%2F%2Fshop.test%2Fproduct",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to initialize browser"));
}
