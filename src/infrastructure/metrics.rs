// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 启动 Prometheus 导出器并注册指标描述
///
/// 未启用时直接返回；监听地址无法解析时返回错误
pub fn init_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = settings.listen_addr.parse()?;

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return Ok(());
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!("review_crawls_total", "Number of review crawls started");
    describe_counter!(
        "review_crawls_failed_total",
        "Number of review crawls that failed during setup"
    );
    describe_counter!(
        "review_pages_processed_total",
        "Number of review pages extracted"
    );
    describe_counter!(
        "review_records_extracted_total",
        "Number of review records extracted"
    );
    describe_counter!(
        "review_containers_skipped_total",
        "Number of review containers skipped after an extraction error"
    );
    describe_counter!(
        "selector_oracle_fallbacks_total",
        "Number of times suggested selectors were unavailable"
    );
    describe_histogram!(
        "review_crawl_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of a review crawl"
    );
}
