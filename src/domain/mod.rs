// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：评论记录、爬取结果和选择器集合
/// - 服务（services）：爬取、提取、分页和选择器推断
pub mod models;
pub mod services;
