// ==========================================
// 工厂日报系统 - 缓存快照
// ==========================================
// 文件: production_data.json
// 格式: {records, fiscalYear, fiscalPeriod, lastUpdate, totalRecords}
// 兼容: 历史写入方直接输出 ProductionRecord[] 数组
// ==========================================

use crate::domain::production::ProductionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CacheSnapshot - 快照文档
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub records: Vec<ProductionRecord>,
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub fiscal_period: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_records: usize,
}

// ==========================================
// SnapshotDocument - 读取时的两种格式
// ==========================================
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SnapshotDocument {
    Envelope(CacheSnapshot),
    Bare(Vec<ProductionRecord>),
}

impl SnapshotDocument {
    pub fn into_snapshot(self) -> CacheSnapshot {
        match self {
            SnapshotDocument::Envelope(snapshot) => snapshot,
            SnapshotDocument::Bare(records) => CacheSnapshot {
                total_records: records.len(),
                records,
                ..CacheSnapshot::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_format() {
        let raw = r#"{
            "records": [{"yearMonth":"202511","day":"20251101","line":"313","item":"I1","quantityActual":5.0,"unit":"M"}],
            "fiscalYear": 2025,
            "fiscalPeriod": "2025/04 - 2026/03",
            "lastUpdate": "2025-11-01T08:00:00Z",
            "totalRecords": 1
        }"#;
        let snapshot = serde_json::from_str::<SnapshotDocument>(raw)
            .unwrap()
            .into_snapshot();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.fiscal_year, Some(2025));
        assert!(snapshot.last_update.is_some());
    }

    #[test]
    fn test_bare_array_format() {
        let raw = r#"[
            {"YEAR_MONTH":"202511","COMP_DAY":"20251101","LINE1":"313","ITEM":"I1","ACT_PRO_QTY":5,"UNIT":"M"},
            {"YEAR_MONTH":"202511","COMP_DAY":"20251102","LINE1":"313","ITEM":"I1","ACT_PRO_QTY":6,"UNIT":"M"}
        ]"#;
        let snapshot = serde_json::from_str::<SnapshotDocument>(raw)
            .unwrap()
            .into_snapshot();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.total_records, 2);
        assert_eq!(snapshot.fiscal_year, None);
    }
}
