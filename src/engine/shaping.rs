// ==========================================
// 工厂日报系统 - 实绩行整形
// ==========================================
// - fold_by_key: 同一业务键（多班次）合并为一行，数量求和
// - aggregate_by_line_item_month: 非明细模式，按 产线+品目+年月 汇总
// - filter_iso_week: 按 ISO 周序号过滤
// ==========================================

use crate::domain::calendar::iso_week_of_day;
use crate::domain::{ProductionRecord, RecordKey};
use std::collections::BTreeMap;

/// 按业务键 (day, item, line) 合并，数量求和
///
/// 合并后的行不再携带班次
pub fn fold_by_key(rows: Vec<ProductionRecord>) -> BTreeMap<RecordKey, ProductionRecord> {
    let mut folded: BTreeMap<RecordKey, ProductionRecord> = BTreeMap::new();
    for mut row in rows {
        row.shift = None;
        match folded.get_mut(&row.key()) {
            Some(existing) => existing.quantity_actual += row.quantity_actual,
            None => {
                folded.insert(row.key(), row);
            }
        }
    }
    folded
}

/// 按 产线+品目+年月 汇总（保留每组第一行的描述字段）
///
/// 每组不跨月，月计划可按组的 year_month 取得
pub fn aggregate_by_line_item_month(rows: Vec<ProductionRecord>) -> Vec<ProductionRecord> {
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut groups: BTreeMap<(String, String, String), ProductionRecord> = BTreeMap::new();
    for row in rows {
        let key = (row.line.clone(), row.item.clone(), row.year_month.clone());
        match groups.get_mut(&key) {
            Some(existing) => existing.quantity_actual += row.quantity_actual,
            None => {
                order.push(key.clone());
                groups.insert(key, row);
            }
        }
    }
    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}

/// 只保留指定 ISO 周的行；日期无法解析的行被丢弃
pub fn filter_iso_week(rows: Vec<ProductionRecord>, week: u32) -> Vec<ProductionRecord> {
    rows.into_iter()
        .filter(|row| iso_week_of_day(&row.day) == Some(week))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: &str, item: &str, line: &str, shift: Option<&str>, qty: f64) -> ProductionRecord {
        ProductionRecord {
            year_month: day[..6].to_string(),
            day: day.to_string(),
            line: line.to_string(),
            line_name: String::new(),
            shift: shift.map(str::to_string),
            item: item.to_string(),
            item_name: String::new(),
            item_desc: String::new(),
            quantity_actual: qty,
            unit: "M".to_string(),
        }
    }

    #[test]
    fn test_fold_sums_shifts() {
        let folded = fold_by_key(vec![
            row("20251103", "I1", "313", Some("1"), 100.0),
            row("20251103", "I1", "313", Some("2"), 50.0),
            row("20251103", "I1", "312", Some("1"), 7.0),
        ]);
        assert_eq!(folded.len(), 2);
        let key = RecordKey {
            day: "20251103".to_string(),
            item: "I1".to_string(),
            line: "313".to_string(),
        };
        assert_eq!(folded[&key].quantity_actual, 150.0);
        assert_eq!(folded[&key].shift, None);
    }

    #[test]
    fn test_aggregate_keeps_first_seen_order() {
        let rows = aggregate_by_line_item_month(vec![
            row("20251105", "B", "313", None, 1.0),
            row("20251104", "A", "313", None, 2.0),
            row("20251103", "B", "313", None, 3.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item, "B");
        assert_eq!(rows[0].quantity_actual, 4.0);
        assert_eq!(rows[0].day, "20251105");
        assert_eq!(rows[1].item, "A");
    }

    #[test]
    fn test_aggregate_does_not_cross_months() {
        let rows = aggregate_by_line_item_month(vec![
            row("20251105", "A", "313", None, 1.0),
            row("20251103", "A", "313", None, 2.0),
            row("20250410", "A", "313", None, 5.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year_month, "202511");
        assert_eq!(rows[0].quantity_actual, 3.0);
        assert_eq!(rows[1].year_month, "202504");
        assert_eq!(rows[1].quantity_actual, 5.0);
    }

    #[test]
    fn test_filter_iso_week() {
        // 2025-11-03 周一 = W45；2025-11-10 = W46
        let rows = filter_iso_week(
            vec![
                row("20251103", "A", "313", None, 1.0),
                row("20251109", "A", "313", None, 1.0),
                row("20251110", "A", "313", None, 1.0),
            ],
            45,
        );
        assert_eq!(rows.len(), 2);
    }
}
