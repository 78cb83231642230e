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

use reviewrs::config::settings::{SelectorStrategy, Settings};
use reviewrs::domain::services::crawl_service::{CrawlOptions, CrawlService};
use reviewrs::domain::services::llm_service::LLMService;
use reviewrs::domain::services::selector_oracle::{
    HeuristicSelectorOracle, LlmSelectorOracle, SelectorOracle,
};
use reviewrs::engines::chromium_engine::ChromiumLauncher;
use reviewrs::engines::traits::BrowserLauncher;
use reviewrs::infrastructure::metrics::init_metrics;
use reviewrs::presentation::routes;
use reviewrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting reviewrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    init_metrics(&settings.metrics)?;

    // 4. Initialize browser launcher and selector oracle
    let launcher: Arc<dyn BrowserLauncher> =
        Arc::new(ChromiumLauncher::new(settings.browser.clone()));

    let oracle: Arc<dyn SelectorOracle> = match settings.selectors.strategy {
        SelectorStrategy::Heuristic => Arc::new(HeuristicSelectorOracle),
        SelectorStrategy::Llm => {
            let llm = Arc::new(LLMService::new(&settings.llm)?);
            info!(
                "Selector suggestions enabled via {} ({})",
                settings.llm.base_url, settings.llm.model
            );
            Arc::new(LlmSelectorOracle::new(llm, settings.selectors.sample_chars))
        }
    };

    let crawl_service = Arc::new(CrawlService::new(
        launcher,
        oracle,
        CrawlOptions::from(&settings.crawl),
    ));

    // 5. Start HTTP server
    let app = routes::app(crawl_service, settings.crawl.clone());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
