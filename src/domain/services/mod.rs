// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取服务（crawl_service）：驱动浏览器逐页爬取评论
/// - 提取服务（extraction_service）：按选择器集合把 HTML 转换为评论记录
/// - LLM服务（llm_service）：本地 Ollama 客户端
/// - 分页服务（pagination_service）：查找"下一页"链接
/// - 评分归一化（rating_normalizer）：把各种评分文本转换为 1-5 的整数
/// - 选择器推断（selector_oracle）：为页面推断评论选择器
pub mod crawl_service;
pub mod extraction_service;
pub mod llm_service;
pub mod pagination_service;
pub mod rating_normalizer;
pub mod selector_oracle;
