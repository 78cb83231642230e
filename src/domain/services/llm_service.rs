// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::LlmSettings;

/// LLM服务错误类型
#[derive(Error, Debug)]
pub enum LlmError {
    /// 连通性探测失败
    #[error("LLM service unreachable: {0}")]
    Unreachable(String),
    /// 服务返回非 2xx 状态码
    #[error("LLM API returned status {0}")]
    Status(u16),
    /// 请求发送或读取失败
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 响应内容不符合预期
    #[error("Invalid response from LLM API: {0}")]
    Decode(String),
}

#[async_trait]
pub trait LLMServiceTrait: Send + Sync {
    /// 探测服务是否可用
    async fn probe(&self) -> Result<(), LlmError>;

    /// 发送提示词并返回模型生成的原始文本
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// LLM服务 - 处理与本地 Ollama 服务的交互
///
/// # 配置
///
/// 通过 `llm` 配置节设置：
/// - `base_url` - 服务基础URL（默认 http://localhost:11434）
/// - `model` - 使用的模型名称（默认 mistral）
/// - `timeout_secs` - 单次请求超时时间
pub struct LLMService {
    client: reqwest::Client,
    model: String,
    api_base_url: String,
}

#[async_trait]
impl LLMServiceTrait for LLMService {
    async fn probe(&self) -> Result<(), LlmError> {
        LLMService::probe(self).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        LLMService::generate(self, prompt).await
    }
}

impl LLMService {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        Self::new_with_config(
            settings.model.clone(),
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn new_with_config(
        model: String,
        api_base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn probe(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/version", self.api_base_url);
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| LlmError::Unreachable(e.to_string()))?;
        Ok(())
    }

    /// 调用生成接口
    ///
    /// # 参数
    /// * `prompt` - 完整的提示词
    ///
    /// # 返回值
    /// * `Ok(String)` - 去掉 markdown 代码块包裹后的模型输出
    /// * `Err(LlmError)` - 请求失败、状态码异常或响应格式错误
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        let url = format!("{}/api/generate", self.api_base_url);
        let response = self.client.post(url).json(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(strip_code_fence(&body.response).to_string())
    }
}

/// 去掉模型输出中可能存在的 markdown 代码块标记
pub fn strip_code_fence(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
