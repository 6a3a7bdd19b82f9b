// ==========================================
// 工厂日报系统 - 生产实绩领域模型
// ==========================================
// 来源: 旧系统生产表 (按 日/品目/产线)
// 业务键: day + item + line（班次 PR 不参与业务键，同键多班次求和）
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ==========================================
// ProductionRecord - 日生产实绩
// ==========================================
// 序列化使用 camelCase；反序列化兼容旧快照的列名
// (YEAR_MONTH / COMP_DAY / LINE1 / ITEM / ITEM1 / ACT_PRO_QTY / UNIT ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    #[serde(alias = "YEAR_MONTH", deserialize_with = "string_or_number")]
    pub year_month: String, // YYYYMM

    #[serde(alias = "COMP_DAY", deserialize_with = "string_or_number")]
    pub day: String, // YYYYMMDD

    #[serde(alias = "LINE1", deserialize_with = "string_or_number")]
    pub line: String, // 产线代码

    #[serde(default, alias = "LN_NAME")]
    pub line_name: String,

    #[serde(
        default,
        alias = "PR",
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub shift: Option<String>, // 班次/批次（不参与业务键）

    #[serde(alias = "ITEM", deserialize_with = "string_or_number")]
    pub item: String, // 品目代码

    #[serde(default, alias = "ITEM1")]
    pub item_name: String,

    #[serde(default, alias = "ITEM2")]
    pub item_desc: String,

    #[serde(alias = "ACT_PRO_QTY")]
    pub quantity_actual: f64, // 实绩数量（基本单位: 米 / 公斤）

    #[serde(default, alias = "UNIT")]
    pub unit: String,
}

impl ProductionRecord {
    /// 业务键
    pub fn key(&self) -> RecordKey {
        RecordKey {
            day: self.day.clone(),
            item: self.item.clone(),
            line: self.line.clone(),
        }
    }

    /// 侧存储键（计划/注释/覆写）: "<item>_<yearMonth>"
    pub fn plan_key(&self) -> String {
        crate::domain::plan::plan_key(&self.item, &self.year_month)
    }
}

// ==========================================
// RecordKey - 缓存业务键
// ==========================================
// 排序: day → item → line，保证快照输出稳定
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub day: String,
    pub item: String,
    pub line: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.day, self.item, self.line)
    }
}

// ==========================================
// 反序列化辅助: 旧数据中代码列可能是数字
// ==========================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::Str(s) => s.trim().to_string(),
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}
