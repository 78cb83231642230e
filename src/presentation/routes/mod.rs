// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::settings::CrawlSettings;
use crate::domain::services::crawl_service::CrawlService;
use crate::presentation::handlers::reviews_handler;

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/api/reviews", get(reviews_handler::get_reviews))
}

/// 创建完整的应用
///
/// 在路由之上挂载爬取服务、爬取配置、请求追踪和 CORS
pub fn app(crawl_service: Arc<CrawlService>, crawl_settings: CrawlSettings) -> Router {
    routes()
        .layer(Extension(crawl_service))
        .layer(Extension(crawl_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
