// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{BrowserLauncher, BrowserSession, EngineError, PageElement};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 查找元素时保存的属性
const SNAPSHOT_ATTRIBUTES: [&str; 1] = ["href"];

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chromium 浏览器启动器
///
/// 基于 chromiumoxide，每次调用 `launch` 都会启动（或连接）一个独立的浏览器
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> Result<BrowserConfig, EngineError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.settings.window_width, self.settings.window_height)
            .request_timeout(Duration::from_secs(self.settings.request_timeout_secs));

        // Production environment setup
        builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if self.settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(EngineError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, EngineError> {
        let remote = self.settings.remote_debugging_url.is_some();
        let (browser, mut handler) = if let Some(ref url) = self.settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url).await.map_err(|e| {
                EngineError::Launch(format!("Failed to connect to remote Chrome: {}", e))
            })?
        } else {
            Browser::launch(self.browser_config()?)
                .await
                .map_err(|e| EngineError::Launch(e.to_string()))?
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(EngineError::Launch(format!("Failed to open page: {}", e)));
            }
        };

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler: handler_task,
            remote,
        }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Chromium 浏览器会话
struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// 连接的是外部 Chrome 时只关闭页面，不关闭浏览器进程
    remote: bool,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), EngineError> {
        // goto waits for the load event by default
        self.page
            .goto(url)
            .await
            .map_err(|e| EngineError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), EngineError> {
        tokio::time::timeout(timeout, async {
            while self.page.find_element(selector).await.is_err() {
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| EngineError::Timeout)
    }

    async fn content(&self) -> Result<String, EngineError> {
        self.page
            .content()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<PageElement>, EngineError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        let mut snapshots = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element
                .inner_text()
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?
                .unwrap_or_default();

            let mut snapshot = PageElement::new(text.trim());
            for name in SNAPSHOT_ATTRIBUTES {
                if let Some(value) = element
                    .attribute(name)
                    .await
                    .map_err(|e| EngineError::Other(e.to_string()))?
                {
                    snapshot = snapshot.with_attr(name, value);
                }
            }
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        let result = if self.remote {
            self.page
                .clone()
                .close()
                .await
                .map_err(|e| EngineError::Other(e.to_string()))
        } else {
            match self.browser.close().await {
                Ok(_) => {
                    if let Err(e) = self.browser.wait().await {
                        warn!("Error waiting for browser process to exit: {}", e);
                    }
                    Ok(())
                }
                Err(e) => Err(EngineError::Other(e.to_string())),
            }
        };

        self.handler.abort();
        debug!("Chromium session closed");
        result
    }
}
