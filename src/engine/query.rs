// ==========================================
// 工厂日报系统 - 期间查询
// ==========================================
// 选择规则:
// - 日期区间: day 字典序区间（YYYYMMDD 零填充，字典序 = 日期序）
// - 财年: yearMonth ∈ [FY04, (FY+1)03]
// - 月: yearMonth 精确匹配，可按 ISO 周再过滤
// 回退: 缓存无命中时直接查询数据源；结果带来源标记
// ==========================================

use crate::domain::calendar::{iso_week_of_day, year_month};
use crate::domain::{FiscalYear, ProductionRecord};
use crate::engine::reconciler::CacheReconciler;
use crate::engine::shaping::{aggregate_by_line_item_month, fold_by_key};
use crate::source::RowQuery;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

// ==========================================
// PeriodRequest - 查询期间
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodRequest {
    Month {
        year: i32,
        month: u32,
        week: Option<u32>,
    },
    /// YYYYMMDD（含两端）
    DateRange { start: String, end: String },
    FiscalYear(FiscalYear),
}

impl PeriodRequest {
    pub fn month(year: i32, month: u32) -> Self {
        PeriodRequest::Month {
            year,
            month,
            week: None,
        }
    }

    pub fn matches(&self, record: &ProductionRecord) -> bool {
        match self {
            PeriodRequest::Month { year, month, week } => {
                record.year_month == year_month(*year, *month)
                    && week.map_or(true, |w| iso_week_of_day(&record.day) == Some(w))
            }
            PeriodRequest::DateRange { start, end } => {
                record.day.as_str() >= start.as_str() && record.day.as_str() <= end.as_str()
            }
            PeriodRequest::FiscalYear(fy) => fy.contains_year_month(&record.year_month),
        }
    }

    /// 回退查询时下发给数据源的请求
    fn source_queries(&self) -> Vec<RowQuery> {
        match self {
            PeriodRequest::Month { year, month, week } => {
                vec![RowQuery::month(*year, *month).with_week(*week)]
            }
            PeriodRequest::DateRange { start, end } => vec![RowQuery::date_range(start, end)],
            PeriodRequest::FiscalYear(fy) => fy
                .months()
                .into_iter()
                .map(|(year, month)| RowQuery::month(year, month))
                .collect(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PeriodRequest::Month { year, month, week } => match week {
                Some(w) => format!("{}-W{}", year_month(*year, *month), w),
                None => year_month(*year, *month),
            },
            PeriodRequest::DateRange { start, end } => format!("{}..{}", start, end),
            PeriodRequest::FiscalYear(fy) => format!("FY{}", fy.0),
        }
    }
}

// ==========================================
// LineFilter - 产线过滤
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter(Vec<String>);

impl LineFilter {
    /// 单个代码或逗号分隔；空串/缺省 = 全部
    pub fn parse(raw: Option<&str>) -> Self {
        let codes = raw
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();
        LineFilter(codes)
    }

    pub fn all() -> Self {
        LineFilter(Vec::new())
    }

    pub fn matches(&self, line: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|code| code == line)
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

// ==========================================
// ProductionQuery / QueryResult
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionQuery {
    pub period: PeriodRequest,
    pub lines: LineFilter,
    pub detailed: bool,
}

impl ProductionQuery {
    pub fn new(period: PeriodRequest) -> Self {
        Self {
            period,
            lines: LineFilter::all(),
            detailed: true,
        }
    }

    pub fn with_lines(mut self, lines: LineFilter) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }
}

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOrigin {
    Cache,
    Source,
    Empty,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    pub records: Vec<ProductionRecord>,
    pub origin: QueryOrigin,
}

// ==========================================
// QueryEngine
// ==========================================
pub struct QueryEngine {
    reconciler: Arc<CacheReconciler>,
}

impl QueryEngine {
    pub fn new(reconciler: Arc<CacheReconciler>) -> Self {
        Self { reconciler }
    }

    /// 执行期间查询（结果按日期倒序）
    pub async fn select(&self, query: &ProductionQuery) -> QueryResult {
        let mut records = self
            .reconciler
            .records_where(|r| query.period.matches(r) && query.lines.matches(&r.line));
        let mut origin = QueryOrigin::Cache;

        if records.is_empty() {
            records = self.select_from_source(query).await;
            origin = if records.is_empty() {
                QueryOrigin::Empty
            } else {
                QueryOrigin::Source
            };
        }

        records.sort_by(|a, b| {
            b.day
                .cmp(&a.day)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.item.cmp(&b.item))
        });
        if !query.detailed {
            records = aggregate_by_line_item_month(records);
        }

        tracing::debug!(
            "期间查询 {}: {} 行, 来源 {:?}",
            query.period.label(),
            records.len(),
            origin
        );
        QueryResult { records, origin }
    }

    async fn select_from_source(&self, query: &ProductionQuery) -> Vec<ProductionRecord> {
        let lines = query.lines.codes().to_vec();
        let requests: Vec<RowQuery> = query
            .period
            .source_queries()
            .into_iter()
            .map(|q| q.with_lines(lines.clone()))
            .collect();

        let results = join_all(requests.iter().map(|q| self.reconciler.fetch_direct(q))).await;

        let mut rows = Vec::new();
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(batch) => rows.extend(batch),
                Err(e) => {
                    tracing::warn!("缓存回退查询失败 {}: {}", request.period.label(), e);
                }
            }
        }

        fold_by_key(rows)
            .into_values()
            .filter(|r| query.period.matches(r) && query.lines.matches(&r.line))
            .collect()
    }
}
