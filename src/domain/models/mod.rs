// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 评论记录（review）：单条评论以及一次爬取的汇总结果
/// - 选择器集合（selector_set）：定位评论容器及字段的 CSS 选择器
pub mod review;
pub mod selector_set;
