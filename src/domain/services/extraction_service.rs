// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::models::review::ReviewRecord;
use crate::domain::models::selector_set::{FieldSelector, SelectorSet};
use crate::domain::services::rating_normalizer::normalize_rating;

const DEFAULT_TITLE: &str = "Review";
const DEFAULT_REVIEWER: &str = "Anonymous";
const DEFAULT_RATING_TEXT: &str = "5";

/// Judge.me 评分组件会把整句说明写进评分元素，需要单独取出数值
const JUDGE_ME_MARKER: &str = "judge.me";

static JUDGE_ME_RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)\s*out of\s*\d+").expect("judge.me pattern is valid"));

/// 单个评论容器的提取错误
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid {field} selector '{selector}': {reason}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        reason: String,
    },
}

/// 编译后的字段选择器
enum CompiledField {
    Absent,
    Ready(Selector),
    Invalid {
        field: &'static str,
        selector: String,
        reason: String,
    },
}

impl CompiledField {
    fn compile(field: &'static str, selector: &FieldSelector) -> Self {
        match selector {
            FieldSelector::Absent => CompiledField::Absent,
            FieldSelector::Present(raw) => match Selector::parse(raw) {
                Ok(selector) => CompiledField::Ready(selector),
                Err(e) => CompiledField::Invalid {
                    field,
                    selector: raw.clone(),
                    reason: format!("{:?}", e),
                },
            },
        }
    }

    /// 返回容器内第一个匹配元素的文本
    fn first_text(&self, container: ElementRef<'_>) -> Result<Option<String>, ExtractionError> {
        match self {
            CompiledField::Absent => Ok(None),
            CompiledField::Ready(selector) => Ok(container.select(selector).next().map(element_text)),
            CompiledField::Invalid {
                field,
                selector,
                reason,
            } => Err(ExtractionError::InvalidSelector {
                field: *field,
                selector: selector.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

struct CompiledSelectors {
    title: CompiledField,
    rating: CompiledField,
    body: CompiledField,
    reviewer: CompiledField,
    date: CompiledField,
}

impl CompiledSelectors {
    fn compile(selectors: &SelectorSet) -> Self {
        Self {
            title: CompiledField::compile("title", &selectors.title),
            rating: CompiledField::compile("rating", &selectors.rating),
            body: CompiledField::compile("body", &selectors.body),
            reviewer: CompiledField::compile("reviewer", &selectors.reviewer),
            date: CompiledField::compile("date", &selectors.date),
        }
    }
}

/// 提取服务
///
/// 负责把渲染后的 HTML 按选择器集合转换为评论记录
pub struct ExtractionService;

impl ExtractionService {
    /// 提取页面中的所有评论
    ///
    /// # 参数
    ///
    /// * `html_content` - 渲染后的 HTML
    /// * `selectors` - 本次爬取使用的选择器集合
    ///
    /// # 返回值
    ///
    /// 按文档顺序排列的评论记录。单个容器提取失败只跳过该容器；
    /// 容器选择器本身不可用时返回空列表
    pub fn extract_reviews(html_content: &str, selectors: &SelectorSet) -> Vec<ReviewRecord> {
        let container_selector = match Selector::parse(&selectors.container) {
            Ok(selector) => selector,
            Err(e) => {
                error!(
                    "Error parsing HTML with container selector '{}': {:?}",
                    selectors.container, e
                );
                return Vec::new();
            }
        };

        let fields = CompiledSelectors::compile(selectors);
        let document = Html::parse_document(html_content);
        let mut reviews = Vec::new();

        for (index, container) in document.select(&container_selector).enumerate() {
            match Self::extract_record(container, &fields) {
                Ok(review) => reviews.push(review),
                Err(e) => {
                    warn!(container = index, "Error extracting review: {}", e);
                    counter!("review_containers_skipped_total").increment(1);
                }
            }
        }

        debug!("Extracted {} reviews", reviews.len());
        counter!("review_records_extracted_total").increment(reviews.len() as u64);
        reviews
    }

    fn extract_record(
        container: ElementRef<'_>,
        fields: &CompiledSelectors,
    ) -> Result<ReviewRecord, ExtractionError> {
        let title = fields
            .title
            .first_text(container)?
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let rating_text = fields
            .rating
            .first_text(container)?
            .unwrap_or_else(|| DEFAULT_RATING_TEXT.to_string());
        let rating = normalize_rating(&widget_rating_text(&rating_text));

        let body = match fields.body.first_text(container)? {
            Some(body) => body,
            None => element_text(container),
        };

        let reviewer = fields
            .reviewer
            .first_text(container)?
            .unwrap_or_else(|| DEFAULT_REVIEWER.to_string());

        let date = fields.date.first_text(container)?;

        Ok(ReviewRecord {
            title,
            body,
            rating,
            reviewer,
            date,
        })
    }
}

/// 针对第三方评分组件的特殊处理：只保留 "N out of M" 中的 N
fn widget_rating_text(rating_text: &str) -> String {
    if !rating_text.to_lowercase().contains(JUDGE_ME_MARKER) {
        return rating_text.to_string();
    }

    JUDGE_ME_RATING
        .captures(rating_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_RATING_TEXT.to_string())
}

/// 元素的可见文本，先拼接所有文本节点，再把连续空白折叠为单个空格
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
