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

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::settings::CrawlSettings;
use crate::domain::models::review::CrawlResult;
use crate::domain::models::selector_set::SelectorSet;
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::pagination_service::PaginationService;
use crate::domain::services::selector_oracle::{SelectorOracle, SelectorResolution};
use crate::engines::lease::BrowserLease;
use crate::engines::traits::{BrowserLauncher, BrowserSession, EngineError};
use crate::utils::url_utils::{normalize_url, resolve_href};

/// 首页加载完成的判定选择器
const BODY_SELECTOR: &str = "body";

/// 爬取错误类型
///
/// 只有浏览器启动和首页加载失败会作为错误返回，翻页阶段的失败视为分页结束
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Failed to initialize browser: {0}")]
    BrowserInit(#[source] EngineError),
    #[error("Failed to load {url}: {source}")]
    InitialPage {
        url: String,
        #[source]
        source: EngineError,
    },
}

/// 爬取参数
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// 每次翻页后的固定等待时间
    pub settle_delay: Duration,
    /// 等待首页 body 出现的超时时间
    pub body_wait_timeout: Duration,
}

impl From<&CrawlSettings> for CrawlOptions {
    fn from(settings: &CrawlSettings) -> Self {
        Self {
            settle_delay: settings.settle_delay(),
            body_wait_timeout: settings.body_wait_timeout(),
        }
    }
}

/// 爬取服务
///
/// 驱动浏览器逐页渲染、提取评论并跟随"下一页"链接：
///
/// Start → 提取 → 查找下一页 → 翻页 → 提取 → ... → Done
///
/// 浏览器在每条退出路径上都会被释放
pub struct CrawlService {
    launcher: Arc<dyn BrowserLauncher>,
    oracle: Arc<dyn SelectorOracle>,
    options: CrawlOptions,
}

impl CrawlService {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        oracle: Arc<dyn SelectorOracle>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            launcher,
            oracle,
            options,
        }
    }

    /// 爬取评论
    ///
    /// # 参数
    ///
    /// * `url` - 起始页面URL
    /// * `max_pages` - 最多处理的页数，为 0 时不启动浏览器
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlResult)` - 汇总结果，可能只包含部分页面
    /// * `Err(CrawlError)` - 浏览器启动或首页加载失败
    pub async fn crawl(&self, url: &str, max_pages: u32) -> Result<CrawlResult, CrawlError> {
        if max_pages == 0 {
            return Ok(CrawlResult::new(Vec::new(), 0));
        }

        let crawl_id = Uuid::new_v4();
        let span = info_span!("crawl", %crawl_id, url = %url, max_pages);

        async move {
            let start = Instant::now();
            counter!("review_crawls_total").increment(1);

            let outcome = match BrowserLease::acquire(self.launcher.as_ref()).await {
                Ok(mut lease) => {
                    let outcome = self.run(&mut lease, url, max_pages).await;
                    lease.release().await;
                    outcome
                }
                Err(e) => Err(CrawlError::BrowserInit(e)),
            };

            histogram!("review_crawl_duration_seconds").record(start.elapsed().as_secs_f64());
            match &outcome {
                Ok(result) => {
                    counter!("review_pages_processed_total").increment(result.pages_processed as u64);
                    info!(
                        "Crawl finished: {} reviews from {} pages",
                        result.total_count, result.pages_processed
                    );
                }
                Err(e) => {
                    counter!("review_crawls_failed_total").increment(1);
                    error!("Error processing reviews: {}", e);
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        session: &mut dyn BrowserSession,
        start_url: &str,
        max_pages: u32,
    ) -> Result<CrawlResult, CrawlError> {
        let initial_failure = |source: EngineError| CrawlError::InitialPage {
            url: start_url.to_string(),
            source,
        };

        session.navigate(start_url).await.map_err(initial_failure)?;
        session
            .wait_for(BODY_SELECTOR, self.options.body_wait_timeout)
            .await
            .map_err(initial_failure)?;
        let mut html = session.content().await.map_err(initial_failure)?;

        let selectors = self.resolve_selectors(&html, start_url).await;

        let mut records = Vec::new();
        let mut current_url = normalize_url(start_url);
        let mut pages_processed = 0u32;

        loop {
            pages_processed += 1;
            info!(page = pages_processed, "Processing page {}", pages_processed);
            records.extend(ExtractionService::extract_reviews(&html, &selectors));

            if pages_processed >= max_pages {
                debug!("Reached page limit of {}", max_pages);
                break;
            }

            let Some(href) = PaginationService::find_next_url(&*session, &selectors).await else {
                debug!("No next page link found");
                break;
            };

            let next_url = resolve_href(&current_url, &href);
            if next_url == current_url {
                info!("Next page link points to the current page, stopping");
                break;
            }

            if let Err(e) = session.navigate(&next_url).await {
                error!("Error navigating to next page: {}", e);
                break;
            }
            tokio::time::sleep(self.options.settle_delay).await;

            html = match session.content().await {
                Ok(html) => html,
                Err(e) => {
                    error!("Error reading page {}: {}", next_url, e);
                    break;
                }
            };
            current_url = next_url;
        }

        Ok(CrawlResult::new(records, pages_processed))
    }

    async fn resolve_selectors(&self, html: &str, url: &str) -> SelectorSet {
        let resolution = self.oracle.resolve(html, url).await;
        match &resolution {
            SelectorResolution::Suggested(_) => {
                info!("Using selectors suggested by {} oracle", self.oracle.name())
            }
            SelectorResolution::Fallback(reason) => {
                debug!("Using heuristic selectors ({})", reason)
            }
        }
        resolution.into_selectors()
    }
}
