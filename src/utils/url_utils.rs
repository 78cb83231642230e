// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 规范化URL并去掉片段，无法解析时原样返回
pub fn normalize_url(url: &str) -> String {
    Url::parse(url)
        .map(without_fragment)
        .unwrap_or_else(|_| url.to_string())
}

/// 基于当前页面URL解析链接
///
/// 结果不带片段，`#` 和 `#reviews` 这类链接会解析回当前页面。
/// 当前URL无法解析或拼接失败时原样返回链接
pub fn resolve_href(current_url: &str, href: &str) -> String {
    Url::parse(current_url)
        .and_then(|base| resolve_url(&base, href))
        .map(without_fragment)
        .unwrap_or_else(|_| href.to_string())
}

fn without_fragment(mut url: Url) -> String {
    url.set_fragment(None);
    url.into()
}
