// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Query},
    Json,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::{
    application::dto::{reviews_request::ReviewsQueryDto, reviews_response::ReviewsResponseDto},
    config::settings::CrawlSettings,
    domain::services::crawl_service::CrawlService,
    presentation::errors::{AppError, ValidationError},
};

/// 抓取商品页面的评论
///
/// `GET /api/reviews?url=<url>&max_pages=<n>`
pub async fn get_reviews(
    Extension(crawl_service): Extension<Arc<CrawlService>>,
    Extension(crawl_settings): Extension<CrawlSettings>,
    Query(query): Query<ReviewsQueryDto>,
) -> Result<Json<ReviewsResponseDto>, AppError> {
    query
        .validate()
        .map_err(|e| ValidationError(e.to_string()))?;
    if !query.has_http_scheme() {
        return Err(ValidationError("url must use http or https".to_string()).into());
    }
    let max_pages = query
        .resolve_max_pages(
            crawl_settings.default_max_pages,
            crawl_settings.max_pages_limit,
        )
        .map_err(ValidationError)?;

    info!("Fetching reviews for {} (max_pages={})", query.url, max_pages);
    let result = crawl_service.crawl(&query.url, max_pages).await?;

    Ok(Json(ReviewsResponseDto::from(result)))
}
