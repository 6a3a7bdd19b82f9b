// ==========================================
// 工厂日报系统 - 日历与财年规则
// ==========================================
// 财年: 当年 4 月 ~ 次年 3 月
// 日期格式:
// - day: YYYYMMDD（零填充，字符串比较即日期比较）
// - yearMonth: YYYYMM
// - 假日/工作日历: YYYY-MM-DD
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每月工作天数（yearMonth -> 天数）
pub type WorkDayCounts = BTreeMap<String, u32>;

/// 财年起始月份
pub const FISCAL_START_MONTH: u32 = 4;

// ==========================================
// FiscalYear - 财年
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    /// 日期所在财年（1-3 月归属上一财年）
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FISCAL_START_MONTH {
            FiscalYear(date.year())
        } else {
            FiscalYear(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    pub fn end_year(&self) -> i32 {
        self.0.saturating_add(1)
    }

    /// 起始年月（含），如 FY2025 -> "202504"
    pub fn start_year_month(&self) -> String {
        year_month(self.start_year(), FISCAL_START_MONTH)
    }

    /// 结束年月（含），如 FY2025 -> "202603"
    pub fn end_year_month(&self) -> String {
        year_month(self.end_year(), FISCAL_START_MONTH - 1)
    }

    /// 财年内 12 个月，按时间顺序
    pub fn months(&self) -> Vec<(i32, u32)> {
        let mut months = Vec::with_capacity(12);
        for month in FISCAL_START_MONTH..=12 {
            months.push((self.start_year(), month));
        }
        for month in 1..FISCAL_START_MONTH {
            months.push((self.end_year(), month));
        }
        months
    }

    /// 年月是否落在财年窗口内（字符串比较）
    pub fn contains_year_month(&self, ym: &str) -> bool {
        ym >= self.start_year_month().as_str() && ym <= self.end_year_month().as_str()
    }

    /// 展示用区间，如 "2025/04 - 2026/03"
    pub fn period_label(&self) -> String {
        format!("{}/04 - {}/03", self.start_year(), self.end_year())
    }
}

// ==========================================
// HolidayEntry - 假日
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub date: String,
    pub description: String,
}

// ==========================================
// 格式工具
// ==========================================

/// 拼接年月 YYYYMM
pub fn year_month(year: i32, month: u32) -> String {
    format!("{}{:02}", year, month)
}

/// 年月格式校验（YYYYMM，月份 01-12）
pub fn is_valid_year_month(value: &str) -> bool {
    parse_year_month(value).is_some()
}

/// 解析年月 YYYYMM -> (year, month)
pub fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = value[..4].parse().ok()?;
    let month: u32 = value[4..].parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

/// 解析 YYYYMMDD
pub fn parse_day(day: &str) -> Option<NaiveDate> {
    if day.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y%m%d").ok()
}

/// 格式化为 YYYYMMDD
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// YYYYMMDD -> YYYY-MM-DD（无效日期返回 None）
pub fn day_to_iso_date(day: &str) -> Option<String> {
    parse_day(day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// 解析 YYYY-MM-DD
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// ISO-8601 周序号（周四锚定）
pub fn iso_week_of_day(day: &str) -> Option<u32> {
    parse_day(day).map(|d| d.iso_week().week())
}
