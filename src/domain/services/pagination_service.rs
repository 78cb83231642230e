// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing::{debug, error};

use crate::domain::models::selector_set::SelectorSet;
use crate::engines::traits::{BrowserSession, PageElement};

/// 表示"下一页"的文本标记（小写匹配）
const FORWARD_MARKERS: [&str; 4] = ["next", "›", "»", "forward"];

/// 分页服务
///
/// 在当前渲染页面中查找"下一页"链接
pub struct PaginationService;

impl PaginationService {
    /// 查找下一页URL
    ///
    /// 返回第一个可见文本包含前进标记的分页元素的 href，保持属性原样不做解析。
    /// 没有分页选择器、没有匹配或查找出错时都返回 `None`
    pub async fn find_next_url(
        session: &dyn BrowserSession,
        selectors: &SelectorSet,
    ) -> Option<String> {
        let selector = selectors.pagination.as_str()?;

        match session.find_elements(selector).await {
            Ok(elements) => {
                let next = Self::pick_next(&elements);
                debug!(
                    "Checked {} pagination elements, next page: {:?}",
                    elements.len(),
                    next
                );
                next
            }
            Err(e) => {
                error!("Error finding next page: {}", e);
                None
            }
        }
    }

    /// 从分页元素中选出"下一页"链接
    pub fn pick_next(elements: &[PageElement]) -> Option<String> {
        elements
            .iter()
            .find(|element| is_forward(&element.text))
            .and_then(|element| element.attr("href").map(str::to_string))
    }
}

fn is_forward(text: &str) -> bool {
    let text = text.to_lowercase();
    FORWARD_MARKERS.iter().any(|marker| text.contains(marker))
}
