// ==========================================
// 工厂日报系统 - 实绩行补全
// ==========================================
// 计划数量优先级: 人工覆写 > 月计划 × 单位系数 > 0
// 单位系数: kg 产线 = 1；其余产线计划以 km 存储，× 1000 换算为米
// 达成率: 计划 > 0 时 actual / plan × 100（两位小数），否则 0
// ==========================================

use crate::domain::calendar::day_to_iso_date;
use crate::domain::{plan_key, PlanEntry, ProductionRecord, WorkDayCounts};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// kg 产线默认代码
pub const DEFAULT_KG_LINE: &str = "312";

/// 透视表置顶产线默认代码
pub const DEFAULT_PRIMARY_LINE: &str = "313";

/// 月工作天数缺省值
pub const DEFAULT_WORK_DAYS: u32 = 20;

/// km → m
const KM_FACTOR: f64 = 1000.0;

// ==========================================
// PlanContext - 侧存储快照
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub plans: BTreeMap<String, PlanEntry>,
    pub overrides: BTreeMap<String, f64>,
    pub comments: BTreeMap<String, String>,
    pub holidays: BTreeMap<String, String>, // YYYY-MM-DD → 说明
    pub work_days: WorkDayCounts,
    pub kg_line_code: String,
    pub primary_line_code: String,
    pub default_work_days: u32,
}

impl Default for PlanContext {
    fn default() -> Self {
        Self {
            plans: BTreeMap::new(),
            overrides: BTreeMap::new(),
            comments: BTreeMap::new(),
            holidays: BTreeMap::new(),
            work_days: WorkDayCounts::new(),
            kg_line_code: DEFAULT_KG_LINE.to_string(),
            primary_line_code: DEFAULT_PRIMARY_LINE.to_string(),
            default_work_days: DEFAULT_WORK_DAYS,
        }
    }
}

impl PlanContext {
    pub fn is_kg_line(&self, line: &str) -> bool {
        line == self.kg_line_code
    }

    /// 产线展示顺序: 置顶产线 > kg 产线 > 其余（按代码）
    pub fn line_rank(&self, line: &str) -> u8 {
        if line == self.primary_line_code {
            0
        } else if self.is_kg_line(line) {
            1
        } else {
            2
        }
    }

    pub fn unit_factor(&self, line: &str) -> f64 {
        if self.is_kg_line(line) {
            1.0
        } else {
            KM_FACTOR
        }
    }

    /// 月计划数量（基本单位）
    pub fn plan_quantity(&self, item: &str, year_month: &str, line: &str) -> f64 {
        let key = plan_key(item, year_month);
        if let Some(quantity) = self.overrides.get(&key) {
            return *quantity;
        }
        self.plans
            .get(&key)
            .map(|plan| plan.quantity * self.unit_factor(line))
            .unwrap_or(0.0)
    }

    /// 月工作天数（未配置或为 0 时取缺省值）
    pub fn work_days_for(&self, year_month: &str) -> u32 {
        match self.work_days.get(year_month) {
            Some(days) if *days > 0 => *days,
            _ => self.default_work_days.max(1),
        }
    }

    pub fn holiday_on(&self, day: &str) -> Option<&String> {
        day_to_iso_date(day).and_then(|iso| self.holidays.get(&iso))
    }

    pub fn enrich(&self, record: &ProductionRecord) -> EnrichedRecord {
        let plan_quantity = self.plan_quantity(&record.item, &record.year_month, &record.line);
        let holiday = self.holiday_on(&record.day);
        EnrichedRecord {
            record: record.clone(),
            plan_quantity,
            percentage: percentage(record.quantity_actual, plan_quantity),
            comment: self
                .comments
                .get(&record.plan_key())
                .cloned()
                .unwrap_or_default(),
            is_holiday: holiday.is_some(),
            holiday_name: holiday.cloned(),
        }
    }

    pub fn enrich_all(&self, records: &[ProductionRecord]) -> Vec<EnrichedRecord> {
        records.iter().map(|r| self.enrich(r)).collect()
    }
}

// ==========================================
// EnrichedRecord - 补全后的实绩行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: ProductionRecord,
    pub plan_quantity: f64,
    pub percentage: f64,
    pub comment: String,
    pub is_holiday: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
}

/// 达成率（计划为 0 时为 0）
pub fn percentage(actual: f64, plan: f64) -> f64 {
    if plan > 0.0 {
        round2(actual / plan * 100.0)
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==========================================
// ProductionSummary - 合计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    pub total_plan: f64,
    pub total_actual: f64,
    pub total_percent: f64,
    pub record_count: usize,
}

/// 合计：计划按 (产线, 品目, 年月) 去重后求和
pub fn summarize(records: &[EnrichedRecord]) -> ProductionSummary {
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
    let mut total_plan = 0.0;
    let mut total_actual = 0.0;
    for enriched in records {
        let r = &enriched.record;
        if seen.insert((r.line.as_str(), r.item.as_str(), r.year_month.as_str())) {
            total_plan += enriched.plan_quantity;
        }
        total_actual += r.quantity_actual;
    }
    ProductionSummary {
        total_plan,
        total_actual,
        total_percent: percentage(total_actual, total_plan),
        record_count: records.len(),
    }
}
