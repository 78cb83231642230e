// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use metrics::counter;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::models::selector_set::SelectorSet;
use crate::domain::services::llm_service::{LLMServiceTrait, LlmError};

/// 默认发送给 LLM 的 HTML 样本长度
pub const DEFAULT_SAMPLE_CHARS: usize = 2000;

/// 回退到启发式选择器的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// 未启用外部建议源
    Disabled,
    /// 连通性探测失败
    Unreachable(String),
    /// 服务返回错误状态码
    BadStatus(u16),
    /// 请求失败
    Transport(String),
    /// 返回内容不是合法的选择器 JSON
    Malformed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Disabled => write!(f, "suggestion source disabled"),
            FallbackReason::Unreachable(e) => write!(f, "suggestion source unreachable: {}", e),
            FallbackReason::BadStatus(code) => write!(f, "suggestion source returned {}", code),
            FallbackReason::Transport(e) => write!(f, "suggestion request failed: {}", e),
            FallbackReason::Malformed(e) => write!(f, "malformed suggestion: {}", e),
        }
    }
}

impl From<LlmError> for FallbackReason {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unreachable(e) => FallbackReason::Unreachable(e),
            LlmError::Status(code) => FallbackReason::BadStatus(code),
            LlmError::Request(e) => FallbackReason::Transport(e.to_string()),
            LlmError::Decode(e) => FallbackReason::Malformed(e),
        }
    }
}

/// 选择器解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorResolution {
    /// 外部建议源给出的选择器
    Suggested(SelectorSet),
    /// 使用启发式选择器
    Fallback(FallbackReason),
}

impl SelectorResolution {
    /// 取出可用的选择器集合，回退时返回启发式选择器
    pub fn into_selectors(self) -> SelectorSet {
        match self {
            SelectorResolution::Suggested(selectors) => selectors,
            SelectorResolution::Fallback(_) => SelectorSet::heuristic(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SelectorResolution::Fallback(_))
    }
}

/// 选择器来源
///
/// 实现方不能向调用方返回错误，任何失败都必须表达为 `SelectorResolution::Fallback`
#[async_trait]
pub trait SelectorOracle: Send + Sync {
    async fn resolve(&self, html: &str, url: &str) -> SelectorResolution;

    fn name(&self) -> &'static str;
}

/// 始终返回启发式选择器
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicSelectorOracle;

#[async_trait]
impl SelectorOracle for HeuristicSelectorOracle {
    async fn resolve(&self, _html: &str, _url: &str) -> SelectorResolution {
        SelectorResolution::Fallback(FallbackReason::Disabled)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// 基于 LLM 的选择器发现
///
/// 先探测服务是否可用，再请求模型分析 HTML 样本；任何一步失败都回退到启发式选择器
pub struct LlmSelectorOracle {
    llm: Arc<dyn LLMServiceTrait>,
    sample_chars: usize,
}

impl LlmSelectorOracle {
    pub fn new(llm: Arc<dyn LLMServiceTrait>, sample_chars: usize) -> Self {
        Self { llm, sample_chars }
    }

    async fn suggest(&self, html: &str, url: &str) -> Result<SelectorSet, FallbackReason> {
        info!("Attempting to connect to selector suggestion service...");
        self.llm.probe().await?;
        info!("Successfully connected to selector suggestion service");

        let prompt = build_prompt(html, url, self.sample_chars);
        let output = self.llm.generate(&prompt).await?;

        decode_selectors(&output).map_err(FallbackReason::Malformed)
    }
}

#[async_trait]
impl SelectorOracle for LlmSelectorOracle {
    async fn resolve(&self, html: &str, url: &str) -> SelectorResolution {
        match self.suggest(html, url).await {
            Ok(selectors) => {
                info!("Using suggested selectors for {}", url);
                SelectorResolution::Suggested(selectors)
            }
            Err(reason) => {
                error!("Falling back to heuristic selectors: {}", reason);
                counter!("selector_oracle_fallbacks_total").increment(1);
                SelectorResolution::Fallback(reason)
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// 构建选择器发现提示词，只嵌入 HTML 的前 `sample_chars` 个字符
pub fn build_prompt(html: &str, url: &str, sample_chars: usize) -> String {
    let sample: String = html.chars().take(sample_chars).collect();
    format!(
        "Analyze this HTML from {url} and identify the CSS selectors for review elements.\n\
         Return only a JSON object with these keys: container, title, rating, body, reviewer, date, pagination.\n\
         Each value should be a CSS selector string or null if not found.\n\
         Sample HTML:\n\
         {sample}\n"
    )
}

/// 将模型输出解码为选择器集合，任何选择器无法编译都视为格式错误
pub fn decode_selectors(output: &str) -> Result<SelectorSet, String> {
    let selectors: SelectorSet = serde_json::from_str(output).map_err(|e| e.to_string())?;
    selectors.validate()?;
    Ok(selectors)
}
