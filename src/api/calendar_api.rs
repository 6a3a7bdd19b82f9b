// ==========================================
// 工厂日报系统 - 日历 API
// ==========================================
// 职责:
// - 月工作天数（work_days.json）: 查询 / 单月编辑 / 批量 / 删除
// - 工作日日历（working_days.json）: 查询 / 整份替换
// - 两者对账
// - 假日（holidays.json）: 查询 / 新增 / 删除
// ==========================================

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    require_field, require_number, validate_iso_date, validate_year_month, NumberInput,
};
use crate::domain::{HolidayEntry, WorkDayCounts};
use crate::engine::{validate_work_days, WorkDayValidationReport};
use crate::importer::parse_work_days_paste;
use crate::repository::SideStores;

/// 单月工作天数上限
const MAX_WORK_DAYS: f64 = 31.0;

// ==========================================
// 请求体
// ==========================================

/// POST /api/workday-edit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDayEditRequest {
    pub month: Option<String>,
    pub days: Option<NumberInput>,
}

/// POST /api/workdays-bulk: workDays（月 → 天数）或 text（粘贴两行）二选一
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDaysBulkRequest {
    pub work_days: Option<BTreeMap<String, NumberInput>>,
    pub text: Option<String>,
}

/// POST /api/working-days
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkingDaysRequest {
    pub dates: Vec<String>,
}

/// POST /api/holidays
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidayRequest {
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub success: bool,
    pub updated: usize,
}

// ==========================================
// CalendarApi
// ==========================================
pub struct CalendarApi {
    stores: Arc<SideStores>,
}

impl CalendarApi {
    pub fn new(stores: Arc<SideStores>) -> Self {
        Self { stores }
    }

    // ==========================================
    // 月工作天数
    // ==========================================

    pub fn get_work_days(&self) -> ApiResult<WorkDayCounts> {
        Ok(self.stores.work_days.get_work_days()?)
    }

    pub fn edit_work_day(&self, request: &WorkDayEditRequest) -> ApiResult<()> {
        let month = require_field("month", request.month.as_deref())?;
        validate_year_month(&month)?;
        let days = parse_days("days", require_number("days", request.days.as_ref())?)?;

        self.stores.work_days.set_month(&month, days)?;
        tracing::info!("工作天数已更新: {} = {}", month, days);
        Ok(())
    }

    pub fn bulk_work_days(&self, request: &WorkDaysBulkRequest) -> ApiResult<BulkSummary> {
        let counts = match (&request.work_days, &request.text) {
            (Some(map), _) => {
                let mut counts = WorkDayCounts::new();
                for (month, value) in map {
                    validate_year_month(month)?;
                    counts.insert(month.clone(), parse_days(month, value.parse(month)?)?);
                }
                counts
            }
            (None, Some(text)) => parse_work_days_paste(text)?,
            (None, None) => {
                return Err(ApiError::InvalidInput(crate::i18n::t_with_args(
                    "validation.missing_field",
                    &[("field", "workDays")],
                )))
            }
        };

        let updated = self.stores.work_days.bulk_set(counts)?;
        tracing::info!("工作天数批量更新: {} 个月", updated);
        Ok(BulkSummary {
            success: true,
            updated,
        })
    }

    pub fn delete_work_day(&self, month: &str) -> ApiResult<()> {
        validate_year_month(month)?;
        if self.stores.work_days.delete_month(month)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("工作天数 {}", month)))
        }
    }

    // ==========================================
    // 工作日日历
    // ==========================================

    pub fn get_working_days(&self) -> ApiResult<Vec<String>> {
        Ok(self
            .stores
            .working_days
            .list()?
            .into_iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect())
    }

    /// 整份替换，返回日期数（重复日期只计一次）
    pub fn replace_working_days(&self, request: &WorkingDaysRequest) -> ApiResult<usize> {
        let mut dates = BTreeSet::new();
        for raw in &request.dates {
            dates.insert(validate_iso_date(raw)?);
        }
        self.stores.working_days.replace(&dates)?;
        tracing::info!("工作日日历已替换: {} 天", dates.len());
        Ok(dates.len())
    }

    pub fn validate(&self) -> ApiResult<WorkDayValidationReport> {
        let counts = self.stores.work_days.get_work_days()?;
        let dates = self.stores.working_days.list()?;
        Ok(validate_work_days(&counts, &dates))
    }

    // ==========================================
    // 假日
    // ==========================================

    pub fn list_holidays(&self) -> ApiResult<Vec<HolidayEntry>> {
        Ok(self.stores.holidays.list_holidays()?)
    }

    pub fn add_holiday(&self, request: &HolidayRequest) -> ApiResult<HolidayEntry> {
        let date = require_field("date", request.date.as_deref())?;
        validate_iso_date(&date)?;
        let entry = HolidayEntry {
            date,
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        };
        self.stores.holidays.add_holiday(&entry)?;
        Ok(entry)
    }

    pub fn delete_holiday(&self, date: &str) -> ApiResult<()> {
        if self.stores.holidays.delete_holiday(date)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("假日 {}", date)))
        }
    }
}

fn parse_days(field: &str, value: f64) -> ApiResult<u32> {
    if value.fract() != 0.0 || !(0.0..=MAX_WORK_DAYS).contains(&value) {
        return Err(ApiError::ValidationError(crate::i18n::t_with_args(
            "validation.invalid_number",
            &[("field", field), ("value", &value.to_string())],
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MonthCheckStatus;
    use crate::repository::MemoryStorage;

    fn api() -> CalendarApi {
        CalendarApi::new(Arc::new(SideStores::new(Arc::new(MemoryStorage::new()))))
    }

    #[test]
    fn test_work_day_edit_and_delete() {
        let api = api();
        api.edit_work_day(&WorkDayEditRequest {
            month: Some("202511".to_string()),
            days: Some(NumberInput::Text("19".to_string())),
        })
        .unwrap();
        assert_eq!(api.get_work_days().unwrap().get("202511"), Some(&19));

        let too_many = WorkDayEditRequest {
            month: Some("202511".to_string()),
            days: Some(NumberInput::Number(40.0)),
        };
        assert!(matches!(api.edit_work_day(&too_many), Err(ApiError::ValidationError(_))));

        api.delete_work_day("202511").unwrap();
        assert!(matches!(api.delete_work_day("202511"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_bulk_from_map_and_paste() {
        let api = api();
        let request: WorkDaysBulkRequest =
            serde_json::from_str(r#"{"workDays": {"202504": 21, "202505": "20"}}"#).unwrap();
        assert_eq!(api.bulk_work_days(&request).unwrap().updated, 2);

        let pasted = WorkDaysBulkRequest {
            work_days: None,
            text: Some("Month\t202506\t202507\nDays\t22\t23\n".to_string()),
        };
        assert_eq!(api.bulk_work_days(&pasted).unwrap().updated, 2);
        assert_eq!(api.get_work_days().unwrap().len(), 4);
    }

    #[test]
    fn test_working_days_and_validation() {
        let api = api();
        api.bulk_work_days(&WorkDaysBulkRequest {
            work_days: Some(BTreeMap::from([("202511".to_string(), NumberInput::Number(2.0))])),
            text: None,
        })
        .unwrap();

        let count = api
            .replace_working_days(&WorkingDaysRequest {
                dates: vec![
                    "2025-11-03".to_string(),
                    "2025-11-04".to_string(),
                    "2025-11-04".to_string(),
                ],
            })
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(api.get_working_days().unwrap(), vec!["2025-11-03", "2025-11-04"]);

        let report = api.validate().unwrap();
        assert!(report.valid);
        assert_eq!(report.months[0].status, MonthCheckStatus::Ok);

        let bad = WorkingDaysRequest {
            dates: vec!["20251103".to_string()],
        };
        assert!(matches!(api.replace_working_days(&bad), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_holidays() {
        let api = api();
        let entry = api
            .add_holiday(&HolidayRequest {
                date: Some("2025-12-31".to_string()),
                description: Some(" NYE ".to_string()),
            })
            .unwrap();
        assert_eq!(entry.description, "NYE");
        assert_eq!(api.list_holidays().unwrap().len(), 1);

        assert!(matches!(
            api.add_holiday(&HolidayRequest::default()),
            Err(ApiError::InvalidInput(_))
        ));

        api.delete_holiday("2025-12-31").unwrap();
        assert!(matches!(api.delete_holiday("2025-12-31"), Err(ApiError::NotFound(_))));
    }
}
