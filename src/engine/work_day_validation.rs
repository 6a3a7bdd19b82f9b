// ==========================================
// 工厂日报系统 - 工作天数校验
// ==========================================
// work_days.json（每月天数）与 working_days.json（逐日日历）对账
// - 每月天数 ≠ 日历中该月日期数 → Mismatch
// - 日历中有、天数表中没有的月份 → Undefined
// ==========================================

use crate::domain::calendar::year_month;
use crate::domain::WorkDayCounts;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthCheckStatus {
    Ok,
    Mismatch,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCheck {
    pub year_month: String,
    pub expected: Option<u32>,
    pub found: u32,
    pub status: MonthCheckStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDayValidationReport {
    pub months: Vec<MonthCheck>,
    pub valid: bool,
}

impl WorkDayValidationReport {
    pub fn problems(&self) -> impl Iterator<Item = &MonthCheck> {
        self.months
            .iter()
            .filter(|m| m.status != MonthCheckStatus::Ok)
    }
}

pub fn validate_work_days(
    counts: &WorkDayCounts,
    working_days: &BTreeSet<NaiveDate>,
) -> WorkDayValidationReport {
    let mut by_month: BTreeMap<String, u32> = BTreeMap::new();
    for date in working_days {
        *by_month
            .entry(year_month(date.year(), date.month()))
            .or_insert(0) += 1;
    }

    let mut months: Vec<MonthCheck> = counts
        .iter()
        .map(|(ym, expected)| {
            let found = by_month.get(ym).copied().unwrap_or(0);
            MonthCheck {
                year_month: ym.clone(),
                expected: Some(*expected),
                found,
                status: if found == *expected {
                    MonthCheckStatus::Ok
                } else {
                    MonthCheckStatus::Mismatch
                },
            }
        })
        .collect();

    months.extend(
        by_month
            .iter()
            .filter(|(ym, _)| !counts.contains_key(*ym))
            .map(|(ym, found)| MonthCheck {
                year_month: ym.clone(),
                expected: None,
                found: *found,
                status: MonthCheckStatus::Undefined,
            }),
    );
    months.sort_by(|a, b| a.year_month.cmp(&b.year_month));

    let valid = months.iter().all(|m| m.status == MonthCheckStatus::Ok);
    WorkDayValidationReport { months, valid }
}
