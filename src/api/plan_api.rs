// ==========================================
// 工厂日报系统 - 计划 API
// ==========================================
// 职责: 月度计划的查询/单项编辑/批量导入/清空，人工覆写数量
// 导入来源: JSON 行（页面解析后的表格）、粘贴文本、表格文件
// ==========================================

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    require_field, require_number, validate_quantity, validate_year_month, NumberInput,
};
use crate::domain::{ManualOverride, PlanEntry};
use crate::importer::{parse_pasted_table, rows_to_plan_entries, RawRow, UniversalFileParser};
use crate::repository::SideStores;

// ==========================================
// 请求体
// ==========================================

/// POST /api/plan-edit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEditRequest {
    pub item_code: Option<String>,
    pub month: Option<String>,
    pub quantity: Option<NumberInput>,
}

/// POST /api/est-qty（estQty 为空表示撤销覆写）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub item_code: Option<String>,
    pub year_month: Option<String>,
    pub est_qty: Option<NumberInput>,
}

/// POST /api/plan-import: planData（行数组）或 text（粘贴文本）二选一
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanImportRequest {
    pub plan_data: Option<Vec<HashMap<String, Value>>>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
}

// ==========================================
// PlanApi
// ==========================================
pub struct PlanApi {
    stores: Arc<SideStores>,
}

impl PlanApi {
    pub fn new(stores: Arc<SideStores>) -> Self {
        Self { stores }
    }

    /// 全部计划（键 "<item>_<yearMonth>"）
    pub fn list_plans(&self) -> ApiResult<BTreeMap<String, PlanEntry>> {
        Ok(self.stores.plans.list_plans()?)
    }

    pub fn edit_plan(&self, request: &PlanEditRequest) -> ApiResult<PlanEntry> {
        let item = require_field("itemCode", request.item_code.as_deref())?;
        let month = require_field("month", request.month.as_deref())?;
        validate_year_month(&month)?;
        let quantity = require_number("quantity", request.quantity.as_ref())?;
        validate_quantity(quantity)?;

        let entry = self.stores.plans.edit_quantity(&item, &month, quantity)?;
        tracing::info!("计划已更新: {} = {}", entry.key(), quantity);
        Ok(entry)
    }

    /// 设置/撤销人工覆写，返回生效的覆写
    pub fn set_override(&self, request: &OverrideRequest) -> ApiResult<Option<ManualOverride>> {
        let item = require_field("itemCode", request.item_code.as_deref())?;
        let year_month = require_field("yearMonth", request.year_month.as_deref())?;
        validate_year_month(&year_month)?;

        let quantity = match &request.est_qty {
            None => None,
            Some(NumberInput::Text(s)) if s.trim().is_empty() => None,
            Some(value) => Some(value.parse("estQty")?),
        };

        match quantity {
            Some(quantity) => {
                validate_quantity(quantity)?;
                let value = ManualOverride {
                    item,
                    year_month,
                    quantity,
                };
                self.stores.overrides.set_override(&value)?;
                tracing::info!("人工覆写: {} = {}", value.key(), quantity);
                Ok(Some(value))
            }
            None => {
                if self.stores.overrides.delete_override(&item, &year_month)? {
                    tracing::info!("人工覆写已撤销: {}_{}", item, year_month);
                }
                Ok(None)
            }
        }
    }

    pub fn list_overrides(&self) -> ApiResult<BTreeMap<String, f64>> {
        Ok(self.stores.overrides.list_overrides()?)
    }

    /// 批量导入（按请求体选择来源）
    pub fn import(&self, request: &PlanImportRequest) -> ApiResult<ImportSummary> {
        let imported = match (&request.plan_data, &request.text) {
            (Some(rows), _) => self.import_rows(&json_rows_to_raw(rows))?,
            (None, Some(text)) => self.import_pasted(text)?,
            (None, None) => {
                return Err(ApiError::InvalidInput(crate::i18n::t_with_args(
                    "validation.missing_field",
                    &[("field", "planData")],
                )))
            }
        };
        Ok(ImportSummary {
            success: true,
            imported,
        })
    }

    pub fn import_rows(&self, rows: &[RawRow]) -> ApiResult<usize> {
        let entries = rows_to_plan_entries(rows)?;
        let count = self.stores.plans.import_plans(entries)?;
        tracing::info!("计划导入完成: {} 条", count);
        Ok(count)
    }

    pub fn import_pasted(&self, text: &str) -> ApiResult<usize> {
        let rows = parse_pasted_table(text)?;
        self.import_rows(&rows)
    }

    /// 从表格文件导入（.xlsx/.xls/.csv/.tsv）
    pub fn import_file(&self, path: &Path) -> ApiResult<usize> {
        let rows = UniversalFileParser.parse(path)?;
        self.import_rows(&rows)
    }

    pub fn clear_plans(&self) -> ApiResult<()> {
        self.stores.plans.clear_plans()?;
        tracing::info!("计划已清空");
        Ok(())
    }
}

/// JSON 单元格 → 文本（数字不带多余小数位）
fn json_rows_to_raw(rows: &[HashMap<String, Value>]) -> Vec<RawRow> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(header, value)| {
                    let text = match value {
                        Value::Null => String::new(),
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (header.trim().to_string(), text)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStorage;

    fn api() -> PlanApi {
        PlanApi::new(Arc::new(SideStores::new(Arc::new(MemoryStorage::new()))))
    }

    #[test]
    fn test_edit_plan_validation() {
        let api = api();
        let missing = PlanEditRequest {
            month: Some("202511".to_string()),
            quantity: Some(NumberInput::Number(1.0)),
            ..Default::default()
        };
        assert!(matches!(api.edit_plan(&missing), Err(ApiError::InvalidInput(_))));

        let bad_month = PlanEditRequest {
            item_code: Some("I1".to_string()),
            month: Some("2025-11".to_string()),
            quantity: Some(NumberInput::Number(1.0)),
        };
        assert!(matches!(api.edit_plan(&bad_month), Err(ApiError::ValidationError(_))));

        let ok = PlanEditRequest {
            item_code: Some("I1".to_string()),
            month: Some("202511".to_string()),
            quantity: Some(NumberInput::Text("12.5".to_string())),
        };
        let entry = api.edit_plan(&ok).unwrap();
        assert_eq!(entry.quantity, 12.5);
        assert_eq!(api.list_plans().unwrap().len(), 1);
    }

    #[test]
    fn test_override_set_and_clear() {
        let api = api();
        let request = OverrideRequest {
            item_code: Some("I1".to_string()),
            year_month: Some("202511".to_string()),
            est_qty: Some(NumberInput::Text("5000".to_string())),
        };
        let value = api.set_override(&request).unwrap().unwrap();
        assert_eq!(value.quantity, 5000.0);
        assert_eq!(api.list_overrides().unwrap().get("I1_202511"), Some(&5000.0));

        let clear = OverrideRequest {
            est_qty: Some(NumberInput::Text(String::new())),
            ..request
        };
        assert_eq!(api.set_override(&clear).unwrap(), None);
        assert!(api.list_overrides().unwrap().is_empty());
    }

    #[test]
    fn test_import_json_rows() {
        let api = api();
        let raw = r#"{"planData": [
            {"Item": "I1", "Item Name": "Belt", "202511": 10, "202512": "12"},
            {"Item": "I2", "202511": null}
        ]}"#;
        let request: PlanImportRequest = serde_json::from_str(raw).unwrap();
        let summary = api.import(&request).unwrap();
        assert_eq!(summary.imported, 2);

        let plans = api.list_plans().unwrap();
        assert_eq!(plans.get("I1_202511").map(|p| p.quantity), Some(10.0));
        assert_eq!(plans.get("I1_202512").map(|p| p.quantity), Some(12.0));
    }

    #[test]
    fn test_import_requires_payload() {
        let api = api();
        assert!(matches!(
            api.import(&PlanImportRequest::default()),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
