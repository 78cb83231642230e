// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::engines::traits::{BrowserLauncher, BrowserSession, EngineError, PageElement};

/// 浏览器租约
///
/// 独占持有一个浏览器会话。正常路径下调用 `release` 关闭浏览器；
/// 若租约在未释放时被丢弃，会在当前 tokio 运行时中后台关闭浏览器。
pub struct BrowserLease {
    session: Option<Box<dyn BrowserSession>>,
}

impl BrowserLease {
    pub async fn acquire(launcher: &dyn BrowserLauncher) -> Result<Self, EngineError> {
        let session = launcher.launch().await?;
        debug!("Browser acquired from {} launcher", launcher.name());
        Ok(Self::new(session))
    }

    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// 关闭浏览器
    ///
    /// 关闭失败只记录日志，不影响调用方已有的结果
    pub async fn release(mut self) {
        if let Some(mut session) = self.session.take() {
            match session.close().await {
                Ok(()) => debug!("Browser released"),
                Err(e) => error!("Error closing browser: {}", e),
            }
        }
    }

    fn active(&self) -> Result<&dyn BrowserSession, EngineError> {
        self.session
            .as_deref()
            .ok_or_else(|| EngineError::Other("browser already released".to_string()))
    }

    fn active_mut(&mut self) -> Result<&mut Box<dyn BrowserSession>, EngineError> {
        self.session
            .as_mut()
            .ok_or_else(|| EngineError::Other("browser already released".to_string()))
    }
}

#[async_trait]
impl BrowserSession for BrowserLease {
    async fn navigate(&mut self, url: &str) -> Result<(), EngineError> {
        self.active_mut()?.navigate(url).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), EngineError> {
        self.active()?.wait_for(selector, timeout).await
    }

    async fn content(&self) -> Result<String, EngineError> {
        self.active()?.content().await
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<PageElement>, EngineError> {
        self.active()?.find_elements(selector).await
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        match self.session.take() {
            Some(mut session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for BrowserLease {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        warn!("Browser lease dropped without release, closing in background");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        error!("Error closing browser: {}", e);
                    }
                });
            }
            Err(_) => error!("No runtime available to close dropped browser"),
        }
    }
}
