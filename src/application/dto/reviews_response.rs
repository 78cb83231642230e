// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::review::{CrawlResult, ReviewRecord};

/// 评论抓取响应
#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewsResponseDto {
    pub reviews_count: usize,
    pub pages_processed: u32,
    pub reviews: Vec<ReviewRecord>,
}

impl From<CrawlResult> for ReviewsResponseDto {
    fn from(result: CrawlResult) -> Self {
        Self {
            reviews_count: result.total_count,
            pages_processed: result.pages_processed,
            reviews: result.records,
        }
    }
}
