// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// 无法识别评分时使用的默认值
pub const DEFAULT_RATING: u8 = 5;

const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;
const STAR_GLYPH: char = '★';

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("number pattern is valid"));

#[derive(Error, Debug, PartialEq)]
enum RatingError {
    #[error("rating scale is zero")]
    ZeroScale,
    #[error("rating value is not finite")]
    NonFinite,
}

/// 将任意评分文本归一化为 1-5 的整数
///
/// 识别顺序：
/// 1. 空文本 → 5
/// 2. "X out of Y" → round(X * 5 / Y)
/// 3. 星形字符 ★ → 字符个数
/// 4. "X/Y" → round(X * 5 / Y)
/// 5. 文本中第一个数字，大于 5 时视为 10 分制并减半
/// 6. 没有数字 → 5
///
/// 解析失败时返回默认值，不会向调用方返回错误
pub fn normalize_rating(rating_text: &str) -> u8 {
    match try_normalize(rating_text) {
        Ok(rating) => rating,
        Err(e) => {
            warn!("Error parsing rating '{}': {}", rating_text, e);
            DEFAULT_RATING
        }
    }
}

fn try_normalize(rating_text: &str) -> Result<u8, RatingError> {
    let text = rating_text.trim().to_lowercase();
    if text.is_empty() {
        return Ok(DEFAULT_RATING);
    }

    if text.contains("out of") {
        let mut parts = text.split("out of");
        let value = parts.next().and_then(first_number);
        let scale = parts.next().and_then(first_number);
        if let (Some(value), Some(scale)) = (value, scale) {
            return scale_to_five(value, scale);
        }
    }

    if text.contains(STAR_GLYPH) {
        return clamp_rounded(text.matches(STAR_GLYPH).count() as f64);
    }

    if text.contains('/') {
        let parts: Vec<&str> = text.split('/').collect();
        if let [numerator, denominator] = parts.as_slice() {
            if let (Ok(numerator), Ok(denominator)) = (
                numerator.trim().parse::<f64>(),
                denominator.trim().parse::<f64>(),
            ) {
                return scale_to_five(numerator, denominator);
            }
        }
    }

    if let Some(mut value) = first_number(&text) {
        // Anything above the 5-point range is treated as a 10-point score
        if value > MAX_RATING {
            value /= 2.0;
        }
        return clamp_rounded(value);
    }

    Ok(DEFAULT_RATING)
}

fn first_number(text: &str) -> Option<f64> {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn scale_to_five(value: f64, scale: f64) -> Result<u8, RatingError> {
    if scale == 0.0 {
        return Err(RatingError::ZeroScale);
    }
    clamp_rounded(value * MAX_RATING / scale)
}

fn clamp_rounded(value: f64) -> Result<u8, RatingError> {
    if !value.is_finite() {
        return Err(RatingError::NonFinite);
    }
    Ok(value.round().clamp(MIN_RATING, MAX_RATING) as u8)
}
