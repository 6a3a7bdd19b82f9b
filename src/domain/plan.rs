// ==========================================
// 工厂日报系统 - 计划领域模型
// ==========================================
// PlanEntry: 品目月度计划（操作员录入/导入）
// ManualOverride: 人工覆写数量，优先于 PlanEntry
// 键: "<item>_<yearMonth>"
// ==========================================

use serde::{Deserialize, Serialize};

/// 侧存储键 "<item>_<yearMonth>"
pub fn plan_key(item: &str, year_month: &str) -> String {
    format!("{}_{}", item, year_month)
}

/// 拆分侧存储键（品目代码本身可能含 '_'，按最后一个 '_' 拆）
pub fn split_plan_key(key: &str) -> Option<(&str, &str)> {
    let (item, ym) = key.rsplit_once('_')?;
    if item.is_empty() || ym.is_empty() {
        return None;
    }
    Some((item, ym))
}

// ==========================================
// PlanEntry - 月度计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub year_month: String,
    #[serde(default)]
    pub quantity: f64, // 月计划数量（km 产线以 km 存储，kg 产线以 kg 存储）
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_desc: String,
    #[serde(default, alias = "line1")]
    pub line: String,
}

impl PlanEntry {
    pub fn new(item: &str, year_month: &str, quantity: f64) -> Self {
        Self {
            item: item.to_string(),
            year_month: year_month.to_string(),
            quantity,
            item_name: String::new(),
            item_desc: String::new(),
            line: String::new(),
        }
    }

    pub fn key(&self) -> String {
        plan_key(&self.item, &self.year_month)
    }
}

// ==========================================
// StoredPlan - 计划文档中的值
// ==========================================
// 历史文档中部分条目仅存数字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPlan {
    Entry(PlanEntry),
    Quantity(f64),
}

impl StoredPlan {
    /// 转换为 PlanEntry，缺失的 item/yearMonth 由键补齐
    pub fn into_entry(self, key: &str) -> PlanEntry {
        let (item, ym) = split_plan_key(key).unwrap_or((key, ""));
        let mut entry = match self {
            StoredPlan::Entry(entry) => entry,
            StoredPlan::Quantity(quantity) => PlanEntry::new(item, ym, quantity),
        };
        if entry.item.is_empty() {
            entry.item = item.to_string();
        }
        if entry.year_month.is_empty() {
            entry.year_month = ym.to_string();
        }
        entry
    }
}

// ==========================================
// ManualOverride - 人工覆写
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    pub item: String,
    pub year_month: String,
    pub quantity: f64,
}

impl ManualOverride {
    pub fn key(&self) -> String {
        plan_key(&self.item, &self.year_month)
    }
}
