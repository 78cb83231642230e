// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 评论抓取请求参数
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReviewsQueryDto {
    #[validate(url)]
    pub url: String,
    /// 最多处理的页数，缺省时使用配置的默认值
    pub max_pages: Option<u32>,
}

impl ReviewsQueryDto {
    /// 校验参数并返回实际使用的页数上限
    ///
    /// # 参数
    ///
    /// * `default_max_pages` - 未指定时使用的页数
    /// * `max_pages_limit` - 允许的最大页数
    pub fn resolve_max_pages(
        &self,
        default_max_pages: u32,
        max_pages_limit: u32,
    ) -> Result<u32, String> {
        let max_pages = self.max_pages.unwrap_or(default_max_pages);
        if !(1..=max_pages_limit).contains(&max_pages) {
            return Err(format!(
                "max_pages must be between 1 and {}",
                max_pages_limit
            ));
        }
        Ok(max_pages)
    }

    /// 只接受 http(s) 绝对地址
    pub fn has_http_scheme(&self) -> bool {
        url::Url::parse(&self.url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}
