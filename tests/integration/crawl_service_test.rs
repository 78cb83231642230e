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

use async_trait::async_trait;
use reviewrs::domain::models::selector_set::{FieldSelector, SelectorSet};
use reviewrs::domain::services::crawl_service::{CrawlError, CrawlOptions, CrawlService};
use reviewrs::domain::services::selector_oracle::{
    HeuristicSelectorOracle, SelectorOracle, SelectorResolution,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::helpers::{ScriptedLauncher, PAGE_ONE, START_URL};

fn options() -> CrawlOptions {
    CrawlOptions {
        settle_delay: Duration::from_millis(2000),
        body_wait_timeout: Duration::from_secs(10),
    }
}

fn crawl_service(launcher: &ScriptedLauncher) -> CrawlService {
    CrawlService::new(
        Arc::new(launcher.clone()),
        Arc::new(HeuristicSelectorOracle),
        options(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_crawl_follows_pagination() {
    let launcher = ScriptedLauncher::two_page_shop();
    let result = crawl_service(&launcher).crawl(START_URL, 5).await.unwrap();

    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.total_count, 5);
    assert_eq!(result.records.len(), 5);

    let titles: Vec<_> = result.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Great fit", "Runs small", "Okay", "Second page", "Review"]
    );
    let ratings: Vec<_> = result.records.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![5, 3, 4, 4, 5]);
    assert_eq!(result.records[0].reviewer, "Alice");
    assert_eq!(result.records[0].date.as_deref(), Some("2024-03-01"));
    assert_eq!(result.records[2].reviewer, "Anonymous");

    assert_eq!(
        launcher.navigations(),
        vec![
            START_URL.to_string(),
            "https://shop.test/product?page=2".to_string()
        ]
    );
    assert_eq!(launcher.launches(), 1);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_page_limit_never_paginates() {
    let launcher = ScriptedLauncher::two_page_shop();
    let result = crawl_service(&launcher).crawl(START_URL, 1).await.unwrap();

    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.total_count, 3);
    assert_eq!(launcher.navigations(), vec![START_URL.to_string()]);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_zero_pages_skips_browser() {
    let launcher = ScriptedLauncher::two_page_shop();
    let result = crawl_service(&launcher).crawl(START_URL, 0).await.unwrap();

    assert_eq!(result.pages_processed, 0);
    assert!(result.records.is_empty());
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_self_link_stops_pagination() {
    let page = r#"
        <div class="review-item"><h3>Only one</h3></div>
        <ul class="pagination"><li><a href="/loop">Next</a></li></ul>
    "#;
    let launcher = ScriptedLauncher::new(&[("https://shop.test/loop", page)]);
    let result = crawl_service(&launcher)
        .crawl("https://shop.test/loop", 5)
        .await
        .unwrap();

    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.total_count, 1);
    assert_eq!(launcher.navigations().len(), 1);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fragment_link_stops_pagination() {
    for href in ["#", "#reviews"] {
        let page = format!(
            r#"
            <div class="review-item"><h3>Only one</h3></div>
            <div class="pagination"><a href="{}">Next</a></div>
            "#,
            href
        );
        let launcher = ScriptedLauncher::new(&[("https://shop.test/js", page.as_str())]);
        let result = crawl_service(&launcher)
            .crawl("https://shop.test/js", 5)
            .await
            .unwrap();

        assert_eq!(result.pages_processed, 1, "href={}", href);
        assert_eq!(result.total_count, 1, "href={}", href);
        assert_eq!(launcher.navigations().len(), 1, "href={}", href);
    }
}

#[tokio::test(start_paused = true)]
async fn test_next_page_navigation_failure_keeps_partial_results() {
    let launcher = ScriptedLauncher::new(&[(START_URL, PAGE_ONE)]);
    let result = crawl_service(&launcher).crawl(START_URL, 5).await.unwrap();

    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.total_count, 3);
    assert_eq!(launcher.navigations().len(), 2);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_next_page_content_failure_keeps_partial_results() {
    let launcher =
        ScriptedLauncher::two_page_shop().with_unreadable("https://shop.test/product?page=2");
    let result = crawl_service(&launcher).crawl(START_URL, 5).await.unwrap();

    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.total_count, 3);
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_launch_failure_is_an_error() {
    let launcher = ScriptedLauncher::failing();
    let err = crawl_service(&launcher)
        .crawl(START_URL, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::BrowserInit(_)));
    assert_eq!(launcher.launches(), 1);
    assert_eq!(launcher.closes(), 0);
}

#[tokio::test]
async fn test_initial_navigation_failure_closes_browser() {
    let launcher = ScriptedLauncher::new(&[]);
    let err = crawl_service(&launcher)
        .crawl("https://unreachable.test/", 5)
        .await
        .unwrap_err();

    match err {
        CrawlError::InitialPage { url, .. } => assert_eq!(url, "https://unreachable.test/"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_initial_content_failure_closes_browser() {
    let launcher = ScriptedLauncher::two_page_shop().with_unreadable(START_URL);
    let err = crawl_service(&launcher)
        .crawl(START_URL, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::InitialPage { .. }));
    assert_eq!(launcher.closes(), 1);
}

/// 记录调用并返回固定选择器的推断源
struct FixedOracle {
    calls: AtomicUsize,
    seen_html: Mutex<Option<String>>,
}

#[async_trait]
impl SelectorOracle for FixedOracle {
    async fn resolve(&self, html: &str, _url: &str) -> SelectorResolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_html.lock().unwrap() = Some(html.to_string());
        SelectorResolution::Suggested(SelectorSet {
            container: "article.rv".to_string(),
            title: FieldSelector::present("h2"),
            rating: FieldSelector::present(".score"),
            body: FieldSelector::present("p"),
            reviewer: FieldSelector::Absent,
            date: FieldSelector::Absent,
            pagination: FieldSelector::present("nav a"),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[tokio::test(start_paused = true)]
async fn test_suggested_selectors_are_used_for_every_page() {
    let first = r#"
        <article class="rv"><h2>Solid</h2><span class="score">4.5/5</span><p>Nice.</p></article>
        <nav><a href="https://shop.test/b">next</a></nav>
    "#;
    let second = r#"
        <article class="rv"><h2>Fine</h2><span class="score">2 out of 5</span><p>Ok.</p></article>
    "#;
    let launcher = ScriptedLauncher::new(&[
        ("https://shop.test/a", first),
        ("https://shop.test/b", second),
    ]);
    let oracle = Arc::new(FixedOracle {
        calls: AtomicUsize::new(0),
        seen_html: Mutex::new(None),
    });
    let service = CrawlService::new(Arc::new(launcher.clone()), oracle.clone(), options());

    let result = service.crawl("https://shop.test/a", 5).await.unwrap();

    assert_eq!(result.pages_processed, 2);
    let ratings: Vec<_> = result.records.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![5, 2]);
    assert_eq!(result.records[0].reviewer, "Anonymous");
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    assert_eq!(oracle.seen_html.lock().unwrap().as_deref(), Some(first));
}
