// ==========================================
// 工厂日报系统 - 输入校验
// ==========================================
// 职责: 写接口/查询参数的格式校验与编辑锁校验
// 消息: 经 i18n 本地化
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::calendar::{is_valid_year_month, parse_day, parse_iso_date};
use crate::i18n::{t, t_with_args};
use chrono::NaiveDate;
use serde::Deserialize;

/// 必填字段（去除首尾空白后非空）
pub fn require_field(field: &str, value: Option<&str>) -> ApiResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::InvalidInput(t_with_args(
            "validation.missing_field",
            &[("field", field)],
        ))),
    }
}

/// 年月 YYYYMM
pub fn validate_year_month(value: &str) -> ApiResult<()> {
    if is_valid_year_month(value) {
        Ok(())
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.invalid_year_month",
            &[("value", value)],
        )))
    }
}

/// 日期参数: 接受 YYYYMMDD 或 YYYY-MM-DD，返回 YYYYMMDD
pub fn normalize_day(value: &str) -> ApiResult<String> {
    let compact: String = value.trim().chars().filter(|c| *c != '-').collect();
    if parse_day(&compact).is_some() {
        Ok(compact)
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.invalid_day",
            &[("value", value)],
        )))
    }
}

/// ISO 日期 YYYY-MM-DD
pub fn validate_iso_date(value: &str) -> ApiResult<NaiveDate> {
    parse_iso_date(value.trim()).ok_or_else(|| {
        ApiError::ValidationError(t_with_args(
            "validation.invalid_iso_date",
            &[("value", value)],
        ))
    })
}

/// 年份（含财年）取值范围
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

pub fn validate_year(field: &str, year: i32) -> ApiResult<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.invalid_year",
            &[("field", field), ("value", &year.to_string())],
        )))
    }
}

pub fn validate_month(month: u32) -> ApiResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.invalid_month",
            &[("value", &month.to_string())],
        )))
    }
}

pub fn validate_date_range(start: &str, end: &str) -> ApiResult<()> {
    if start <= end {
        Ok(())
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.invalid_range",
            &[("start", start), ("end", end)],
        )))
    }
}

pub fn validate_quantity(value: f64) -> ApiResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::ValidationError(t_with_args(
            "validation.negative_quantity",
            &[("value", &value.to_string())],
        )))
    }
}

/// 编辑锁: 配置了口令时，请求口令必须一致
pub fn check_edit_password(expected: Option<&str>, provided: Option<&str>) -> ApiResult<()> {
    match expected {
        Some(expected) if !expected.is_empty() => {
            if provided == Some(expected) {
                Ok(())
            } else {
                Err(ApiError::Forbidden(t("auth.locked")))
            }
        }
        _ => Ok(()),
    }
}

// ==========================================
// NumberInput - 表单数值（数字或文本）
// ==========================================
// 页面表单可能以字符串提交数值
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    pub fn parse(&self, field: &str) -> ApiResult<f64> {
        match self {
            NumberInput::Number(n) => Ok(*n),
            NumberInput::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ApiError::ValidationError(t_with_args(
                    "validation.invalid_number",
                    &[("field", field), ("value", s)],
                ))
            }),
        }
    }
}

/// 必填数值字段
pub fn require_number(field: &str, value: Option<&NumberInput>) -> ApiResult<f64> {
    match value {
        Some(NumberInput::Text(s)) if s.trim().is_empty() => Err(ApiError::InvalidInput(
            t_with_args("validation.missing_field", &[("field", field)]),
        )),
        Some(v) => v.parse(field),
        None => Err(ApiError::InvalidInput(t_with_args(
            "validation.missing_field",
            &[("field", field)],
        ))),
    }
}
