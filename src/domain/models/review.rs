// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 评论记录
///
/// 从单个评论容器中提取出的结构化数据，`rating` 始终位于 1 到 5 之间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub title: String,
    pub body: String,
    pub rating: u8,
    pub reviewer: String,
    pub date: Option<String>,
}

/// 爬取结果
///
/// 按文档顺序汇总所有页面提取到的评论
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub records: Vec<ReviewRecord>,
    /// 实际提取过内容的页数
    pub pages_processed: u32,
    pub total_count: usize,
}

impl CrawlResult {
    pub fn new(records: Vec<ReviewRecord>, pages_processed: u32) -> Self {
        let total_count = records.len();
        Self {
            records,
            pages_processed,
            total_count,
        }
    }
}
