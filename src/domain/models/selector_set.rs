// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Selector;
use serde::{Deserialize, Serialize};

/// 单个字段的选择器
///
/// `Absent` 表示该字段没有专用选择器，提取时使用字段的默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FieldSelector {
    Present(String),
    Absent,
}

impl FieldSelector {
    pub fn present(selector: impl Into<String>) -> Self {
        FieldSelector::Present(selector.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldSelector::Present(s) => Some(s.as_str()),
            FieldSelector::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldSelector::Present(_))
    }
}

impl Default for FieldSelector {
    fn default() -> Self {
        FieldSelector::Absent
    }
}

impl From<Option<String>> for FieldSelector {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => FieldSelector::Present(s.trim().to_string()),
            _ => FieldSelector::Absent,
        }
    }
}

impl From<FieldSelector> for Option<String> {
    fn from(value: FieldSelector) -> Self {
        match value {
            FieldSelector::Present(s) => Some(s),
            FieldSelector::Absent => None,
        }
    }
}

/// 评论选择器集合
///
/// 描述如何在页面中定位评论容器及其各个字段。一次爬取会话内只解析一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    /// 评论容器选择器（必填）
    pub container: String,
    #[serde(default)]
    pub title: FieldSelector,
    #[serde(default)]
    pub rating: FieldSelector,
    #[serde(default)]
    pub body: FieldSelector,
    #[serde(default)]
    pub reviewer: FieldSelector,
    #[serde(default)]
    pub date: FieldSelector,
    /// 分页链接选择器
    #[serde(default)]
    pub pagination: FieldSelector,
}

impl SelectorSet {
    /// 内置的启发式选择器
    ///
    /// 基于 class 属性子串匹配，适用于大多数未知结构的评论页面
    pub fn heuristic() -> Self {
        Self {
            container: "div[class*='review'], div[class*='comment']".to_string(),
            title: FieldSelector::present("h3, h4, strong"),
            rating: FieldSelector::present("span[class*='rating'], div[class*='stars']"),
            body: FieldSelector::present("div[class*='content'], div[class*='text']"),
            reviewer: FieldSelector::present("span[class*='author'], span[class*='name']"),
            date: FieldSelector::present("span[class*='date']"),
            pagination: FieldSelector::present("ul.pagination a, div[class*='pagination'] a"),
        }
    }

    /// 检查所有选择器是否都是合法的 CSS 选择器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 全部合法
    /// * `Err(String)` - 第一个不合法的选择器及原因
    pub fn validate(&self) -> Result<(), String> {
        if self.container.trim().is_empty() {
            return Err("container selector is empty".to_string());
        }

        let fields = [
            ("container", Some(self.container.as_str())),
            ("title", self.title.as_str()),
            ("rating", self.rating.as_str()),
            ("body", self.body.as_str()),
            ("reviewer", self.reviewer.as_str()),
            ("date", self.date.as_str()),
            ("pagination", self.pagination.as_str()),
        ];

        for (name, selector) in fields {
            if let Some(selector) = selector {
                Selector::parse(selector)
                    .map_err(|e| format!("invalid {} selector '{}': {:?}", name, selector, e))?;
            }
        }

        Ok(())
    }
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self::heuristic()
    }
}
