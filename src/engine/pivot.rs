// ==========================================
// 工厂日报系统 - 月度透视表
// ==========================================
// 行: 品目 (产线, 品目) × {Plan, Act, %}
// 列: 当月工作日（截至今天）；工作日历为空时退回实绩出现过的日期
// 日计划 = 月计划 / 月工作天数
// 排序: 313 → 312 → 其余产线（字典序），同产线按品目
// ==========================================

use crate::domain::calendar::{format_day, year_month};
use crate::domain::ProductionRecord;
use crate::engine::enrichment::{percentage, PlanContext};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// 输出结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotCell {
    pub day: String,
    pub plan: f64,
    pub actual: f64,
    pub percent: Option<f64>, // 日计划为 0 时为 None（展示为 "-"）
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpToTotals {
    pub date: String,
    pub plan: f64,
    pub actual: f64,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotRow {
    pub line: String,
    pub item: String,
    pub item_name: String,
    pub item_desc: String,
    pub month_plan: f64,
    pub cells: Vec<PivotCell>,
    pub total_plan: f64,
    pub total_actual: f64,
    pub total_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_to: Option<UpToTotals>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub line: String,
    pub unit: String,
    pub plan: f64,   // 展示单位（kg / km）
    pub actual: f64, // 展示单位（kg / km）
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    pub year_month: String,
    pub days: Vec<String>,
    pub holidays: BTreeMap<String, String>, // 列日期 YYYYMMDD → 说明
    pub rows: Vec<PivotRow>,
    pub line_totals: Vec<LineTotal>,
}

// ==========================================
// PivotBuilder
// ==========================================
pub struct PivotBuilder<'a> {
    context: &'a PlanContext,
    year: i32,
    month: u32,
    today: NaiveDate,
    working_days: Vec<NaiveDate>,
    up_to: Option<NaiveDate>,
}

impl<'a> PivotBuilder<'a> {
    pub fn new(context: &'a PlanContext, year: i32, month: u32, today: NaiveDate) -> Self {
        Self {
            context,
            year,
            month,
            today,
            working_days: Vec::new(),
            up_to: None,
        }
    }

    pub fn working_days(mut self, days: Vec<NaiveDate>) -> Self {
        self.working_days = days;
        self
    }

    pub fn up_to(mut self, date: Option<NaiveDate>) -> Self {
        self.up_to = date;
        self
    }

    pub fn build(&self, records: &[ProductionRecord]) -> PivotTable {
        let ym = year_month(self.year, self.month);
        let month_records: Vec<&ProductionRecord> =
            records.iter().filter(|r| r.year_month == ym).collect();
        let days = self.column_days(&ym, &month_records);

        // (line, item) → (首行, day → 实绩)
        let mut groups: BTreeMap<(String, String), (&ProductionRecord, BTreeMap<&str, f64>)> =
            BTreeMap::new();
        for record in &month_records {
            let entry = groups
                .entry((record.line.clone(), record.item.clone()))
                .or_insert_with(|| (*record, BTreeMap::new()));
            *entry.1.entry(record.day.as_str()).or_insert(0.0) += record.quantity_actual;
        }

        let work_days = f64::from(self.context.work_days_for(&ym));
        let up_to_day = self.up_to.map(format_day);

        let mut rows: Vec<PivotRow> = groups
            .into_values()
            .map(|(info, actuals)| {
                let month_plan = self.context.plan_quantity(&info.item, &ym, &info.line);
                let daily_plan = month_plan / work_days;

                let cells: Vec<PivotCell> = days
                    .iter()
                    .map(|day| {
                        let actual = actuals.get(day.as_str()).copied().unwrap_or(0.0);
                        PivotCell {
                            day: day.clone(),
                            plan: daily_plan,
                            actual,
                            percent: daily_percent(actual, daily_plan),
                        }
                    })
                    .collect();

                let total_actual: f64 = cells.iter().map(|c| c.actual).sum();
                let up_to = up_to_day.as_ref().map(|limit| {
                    let covered: Vec<&PivotCell> =
                        cells.iter().filter(|c| c.day.as_str() <= limit.as_str()).collect();
                    let plan = daily_plan * covered.len() as f64;
                    let actual: f64 = covered.iter().map(|c| c.actual).sum();
                    UpToTotals {
                        date: limit.clone(),
                        plan,
                        actual,
                        percent: daily_percent(actual, plan),
                    }
                });

                PivotRow {
                    line: info.line.clone(),
                    item: info.item.clone(),
                    item_name: info.item_name.clone(),
                    item_desc: info.item_desc.clone(),
                    month_plan,
                    cells,
                    total_plan: month_plan,
                    total_actual,
                    total_percent: percentage(total_actual, month_plan),
                    up_to,
                    comment: self
                        .context
                        .comments
                        .get(&info.plan_key())
                        .cloned()
                        .unwrap_or_default(),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            compare_lines(self.context, &a.line, &b.line)
                .then_with(|| a.item.cmp(&b.item))
        });

        let holidays = days
            .iter()
            .filter_map(|day| {
                self.context
                    .holiday_on(day)
                    .map(|desc| (day.clone(), desc.clone()))
            })
            .collect();

        PivotTable {
            year_month: ym,
            line_totals: self.line_totals(&rows),
            days,
            holidays,
            rows,
        }
    }

    fn column_days(&self, ym: &str, records: &[&ProductionRecord]) -> Vec<String> {
        let today = format_day(self.today);
        let from_calendar: BTreeSet<String> = self
            .working_days
            .iter()
            .map(|d| format_day(*d))
            .filter(|d| d.starts_with(ym) && d.as_str() <= today.as_str())
            .collect();
        if !from_calendar.is_empty() {
            return from_calendar.into_iter().collect();
        }
        records
            .iter()
            .map(|r| r.day.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn line_totals(&self, rows: &[PivotRow]) -> Vec<LineTotal> {
        let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for row in rows {
            let entry = sums.entry(row.line.as_str()).or_insert((0.0, 0.0));
            entry.0 += row.total_plan;
            entry.1 += row.total_actual;
        }
        let mut totals: Vec<LineTotal> = sums
            .into_iter()
            .map(|(line, (plan, actual))| {
                let factor = self.context.unit_factor(line);
                LineTotal {
                    line: line.to_string(),
                    unit: if self.context.is_kg_line(line) { "kg" } else { "km" }.to_string(),
                    plan: plan / factor,
                    actual: actual / factor,
                    percent: percentage(actual, plan),
                }
            })
            .collect();
        totals.sort_by(|a, b| compare_lines(self.context, &a.line, &b.line));
        totals
    }
}

fn daily_percent(actual: f64, plan: f64) -> Option<f64> {
    if plan > 0.0 {
        Some(percentage(actual, plan))
    } else {
        None
    }
}

fn compare_lines(context: &PlanContext, a: &str, b: &str) -> Ordering {
    context
        .line_rank(a)
        .cmp(&context.line_rank(b))
        .then_with(|| a.cmp(b))
}
