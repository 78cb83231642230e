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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、浏览器、爬取、选择器、LLM和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 选择器发现配置
    pub selectors: SelectorSettings,
    /// LLM 配置
    pub llm: LlmSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 是否以无头模式运行
    pub headless: bool,
    /// 是否禁用沙箱
    pub no_sandbox: bool,
    /// 窗口宽度
    pub window_width: u32,
    /// 窗口高度
    pub window_height: u32,
    /// CDP 请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 远程调试地址，设置后连接已有的 Chrome 而不是启动新进程
    pub remote_debugging_url: Option<String>,
    /// Chrome 可执行文件路径
    pub executable: Option<String>,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 未指定时的最大页数
    pub default_max_pages: u32,
    /// 允许请求的最大页数上限
    pub max_pages_limit: u32,
    /// 每次翻页后的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 等待首页 body 出现的超时时间（秒）
    pub body_wait_timeout_secs: u64,
}

impl CrawlSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn body_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.body_wait_timeout_secs)
    }
}

/// 选择器来源策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorStrategy {
    /// 始终使用内置的启发式选择器
    Heuristic,
    /// 先询问 LLM，失败时回退到启发式选择器
    Llm,
}

/// 选择器发现配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorSettings {
    pub strategy: SelectorStrategy,
    /// 发送给 LLM 的 HTML 样本长度（字符）
    pub sample_chars: usize,
}

/// LLM配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Ollama 服务基础URL
    pub base_url: String,
    /// 使用的模型名称
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    /// Prometheus 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("REVIEWRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅使用内置默认值构建配置，不读取文件和环境变量
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Browser
            .set_default("browser.headless", true)?
            .set_default("browser.no_sandbox", true)?
            .set_default("browser.window_width", 1920)?
            .set_default("browser.window_height", 1080)?
            .set_default("browser.request_timeout_secs", 30)?
            // Crawl
            .set_default("crawl.default_max_pages", 5)?
            .set_default("crawl.max_pages_limit", 50)?
            .set_default("crawl.settle_delay_ms", 2000)?
            .set_default("crawl.body_wait_timeout_secs", 10)?
            // Selectors
            .set_default("selectors.strategy", "heuristic")?
            .set_default("selectors.sample_chars", 2000)?
            // LLM (local Ollama)
            .set_default("llm.base_url", "http://localhost:11434")?
            .set_default("llm.model", "mistral")?
            .set_default("llm.timeout_secs", 30)?
            // Metrics
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}
