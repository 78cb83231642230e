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
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 浏览器启动或连接失败
    #[error("Failed to initialize browser: {0}")]
    Launch(String),
    /// 页面导航失败
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    /// 等待超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 页面元素快照
///
/// 保存元素的可见文本和属性，脱离浏览器后仍可读取
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElement {
    /// 元素可见文本
    pub text: String,
    /// 元素属性
    pub attributes: HashMap<String, String>,
}

impl PageElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// 浏览器会话特质
///
/// 一个会话对应一个独占的浏览器实例和其中的单个页面
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// 导航到指定URL并等待页面加载
    async fn navigate(&mut self, url: &str) -> Result<(), EngineError>;

    /// 等待选择器匹配到元素，超过 `timeout` 返回 `EngineError::Timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), EngineError>;

    /// 获取当前渲染后的 HTML
    async fn content(&self) -> Result<String, EngineError>;

    /// 查找所有匹配选择器的元素
    async fn find_elements(&self, selector: &str) -> Result<Vec<PageElement>, EngineError>;

    /// 关闭浏览器并释放资源
    async fn close(&mut self) -> Result<(), EngineError>;
}

/// 浏览器启动器特质
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// 启动一个新的浏览器会话
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, EngineError>;

    /// 启动器名称
    fn name(&self) -> &'static str;
}
