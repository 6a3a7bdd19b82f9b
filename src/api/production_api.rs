// ==========================================
// 工厂日报系统 - 生产实绩 API
// ==========================================
// 职责:
// - 期间查询（月 / 周 / 日期区间 / 财年）+ 计划补全 + 合计
// - 月度透视表
// - 缓存状态 / 手动刷新 / 清空
// - CSV 导出
// 参数: 查询串原样以字符串接收，在此统一校验
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{normalize_day, validate_date_range, validate_month, validate_year};
use crate::domain::calendar::parse_day;
use crate::domain::FiscalYear;
use crate::engine::{
    summarize, CacheReconciler, CacheStatus, EnrichedRecord, LineFilter, PeriodRequest,
    PivotBuilder, PivotTable, PlanContext, ProductionQuery, ProductionSummary, QueryEngine,
    QueryOrigin, RefreshOutcome,
};
use crate::export::{export_file_name, render_csv};
use crate::repository::SideStores;

// ==========================================
// 请求参数
// ==========================================

/// /api/production 与 /api/export-csv 的查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionParams {
    pub year: Option<String>,
    pub month: Option<String>,
    pub week: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub fiscal_year: Option<String>,
    pub line: Option<String>,
    pub detailed: Option<String>,
}

impl ProductionParams {
    /// 解析为期间查询
    ///
    /// 优先级: 日期区间 > 财年 > 年月（缺省为 today 所在月）
    pub fn into_query(&self, today: NaiveDate) -> ApiResult<ProductionQuery> {
        let period = match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (Some(start), Some(end)) => {
                let start = normalize_day(start)?;
                let end = normalize_day(end)?;
                validate_date_range(&start, &end)?;
                PeriodRequest::DateRange { start, end }
            }
            (Some(_), None) => return Err(missing("endDate")),
            (None, Some(_)) => return Err(missing("startDate")),
            (None, None) => match non_empty(&self.fiscal_year) {
                Some(fy) => {
                    let fiscal_year: i32 = parse_int(fy, "fiscalYear")?;
                    validate_year("fiscalYear", fiscal_year)?;
                    PeriodRequest::FiscalYear(FiscalYear(fiscal_year))
                }
                None => {
                    let (year, month) = year_and_month(&self.year, &self.month, today)?;
                    let week = match non_empty(&self.week) {
                        Some(w) => {
                            let week: u32 = parse_int(w, "week")?;
                            if !(1..=53).contains(&week) {
                                return Err(ApiError::ValidationError(format!(
                                    "ISO 周超出范围: {}",
                                    week
                                )));
                            }
                            Some(week)
                        }
                        None => None,
                    };
                    PeriodRequest::Month { year, month, week }
                }
            },
        };

        Ok(ProductionQuery::new(period)
            .with_lines(LineFilter::parse(self.line.as_deref()))
            .with_detailed(parse_flag(self.detailed.as_deref())))
    }
}

/// /api/pivot 的查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotParams {
    pub year: Option<String>,
    pub month: Option<String>,
    pub line: Option<String>,
    pub up_to: Option<String>,
}

// ==========================================
// 响应
// ==========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionResponse {
    pub success: bool,
    pub period: String,
    pub origin: QueryOrigin,
    pub data: Vec<EnrichedRecord>,
    pub summary: ProductionSummary,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub outcome: RefreshOutcome,
    pub status: CacheStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cache: CacheStatus,
}

/// CSV 导出结果
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

// ==========================================
// ProductionApi
// ==========================================
pub struct ProductionApi {
    reconciler: Arc<CacheReconciler>,
    engine: QueryEngine,
    stores: Arc<SideStores>,
    kg_line_code: String,
    primary_line_code: String,
    default_work_days: u32,
}

impl ProductionApi {
    pub fn new(
        reconciler: Arc<CacheReconciler>,
        stores: Arc<SideStores>,
        kg_line_code: &str,
        primary_line_code: &str,
        default_work_days: u32,
    ) -> Self {
        Self {
            engine: QueryEngine::new(reconciler.clone()),
            reconciler,
            stores,
            kg_line_code: kg_line_code.to_string(),
            primary_line_code: primary_line_code.to_string(),
            default_work_days,
        }
    }

    /// 读取全部侧存储，组装补全上下文
    pub fn plan_context(&self) -> ApiResult<PlanContext> {
        Ok(PlanContext {
            plans: self.stores.plans.list_plans()?,
            overrides: self.stores.overrides.list_overrides()?,
            comments: self.stores.comments.get_comments()?,
            holidays: self.stores.holidays.holiday_map()?,
            work_days: self.stores.work_days.get_work_days()?,
            kg_line_code: self.kg_line_code.clone(),
            primary_line_code: self.primary_line_code.clone(),
            default_work_days: self.default_work_days,
        })
    }

    /// 期间查询 + 补全 + 合计
    pub async fn get_production(
        &self,
        params: &ProductionParams,
        today: NaiveDate,
    ) -> ApiResult<ProductionResponse> {
        let query = params.into_query(today)?;
        let result = self.engine.select(&query).await;
        let context = self.plan_context()?;
        let data = context.enrich_all(&result.records);
        let summary = summarize(&data);

        Ok(ProductionResponse {
            success: true,
            period: query.period.label(),
            origin: result.origin,
            data,
            summary,
            last_update: self.reconciler.status().last_update,
        })
    }

    /// 月度透视表
    pub async fn get_pivot(&self, params: &PivotParams, today: NaiveDate) -> ApiResult<PivotTable> {
        let (year, month) = year_and_month(&params.year, &params.month, today)?;
        let up_to = match non_empty(&params.up_to) {
            Some(raw) => parse_day(&normalize_day(raw)?),
            None => None,
        };

        let query = ProductionQuery::new(PeriodRequest::month(year, month))
            .with_lines(LineFilter::parse(params.line.as_deref()));
        let result = self.engine.select(&query).await;
        let context = self.plan_context()?;
        let working_days = self.stores.working_days.dates_in_month(year, month)?;

        Ok(PivotBuilder::new(&context, year, month, today)
            .working_days(working_days)
            .up_to(up_to)
            .build(&result.records))
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.reconciler.status()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok",
            version: crate::VERSION,
            cache: self.reconciler.status(),
        }
    }

    /// 手动刷新（Cold 时为全量加载，否则为当月增量）
    pub async fn refresh_cache(&self) -> RefreshResponse {
        let outcome = self.reconciler.refresh().await;
        tracing::info!("手动刷新完成: {:?}", outcome);
        RefreshResponse {
            success: !matches!(outcome, RefreshOutcome::SourceFailed { .. }),
            message: crate::i18n::t("cache.refreshed"),
            outcome,
            status: self.reconciler.status(),
        }
    }

    pub fn clear_cache(&self) -> CacheStatus {
        self.reconciler.clear();
        self.reconciler.status()
    }

    /// CSV 导出（参数同期间查询）
    pub async fn export_csv(
        &self,
        params: &ProductionParams,
        today: NaiveDate,
    ) -> ApiResult<CsvExport> {
        let response = self.get_production(params, today).await?;
        let body = render_csv(&response.data)?;
        Ok(CsvExport {
            file_name: export_file_name(&response.period),
            body,
        })
    }
}

// ==========================================
// 参数工具
// ==========================================

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn missing(field: &str) -> ApiError {
    ApiError::InvalidInput(crate::i18n::t_with_args(
        "validation.missing_field",
        &[("field", field)],
    ))
}

fn parse_int<T: std::str::FromStr>(raw: &str, field: &str) -> ApiResult<T> {
    raw.trim().parse::<T>().map_err(|_| {
        ApiError::ValidationError(crate::i18n::t_with_args(
            "validation.invalid_number",
            &[("field", field), ("value", raw)],
        ))
    })
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

fn year_and_month(
    year: &Option<String>,
    month: &Option<String>,
    today: NaiveDate,
) -> ApiResult<(i32, u32)> {
    let year = match non_empty(year) {
        Some(y) => parse_int(y, "year")?,
        None => today.year(),
    };
    let month = match non_empty(month) {
        Some(m) => parse_int(m, "month")?,
        None => today.month(),
    };
    validate_year("year", year)?;
    validate_month(month)?;
    Ok((year, month))
}
