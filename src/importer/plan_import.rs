// ==========================================
// 工厂日报系统 - 计划表导入
// ==========================================
// 两种版式:
// - 宽表: 每个月一列，表头 YYYYMM 或 YYYY-MM
// - 长表: Month + Quantity 两列，每行一个 品目×月
// 品目列: Item / ITEM / Item Code / ItemCode；缺失品目的行跳过
// 数量为空的单元格跳过；非数字数量为导入错误（带行号）
// ==========================================

use crate::domain::calendar::is_valid_year_month;
use crate::domain::{PlanEntry, WorkDayCounts};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;

const ITEM_COLUMNS: &[&str] = &["Item", "ITEM", "Item Code", "ItemCode"];
const NAME_COLUMNS: &[&str] = &["Item Name", "ItemName", "ITEM_NAME", "Name"];
const DESC_COLUMNS: &[&str] = &["Item Desc", "ItemDesc", "ITEM_DESC", "Description"];
const LINE_COLUMNS: &[&str] = &["Line", "LINE", "LINE1"];
const MONTH_COLUMNS: &[&str] = &["Month", "MONTH", "Year Month", "YearMonth"];
const QUANTITY_COLUMNS: &[&str] = &["Quantity", "QUANTITY", "Qty", "Plan"];

/// 表头为月份时返回 YYYYMM（接受 YYYYMM / YYYY-MM）
pub fn normalize_month_header(header: &str) -> Option<String> {
    let compact: String = header.trim().chars().filter(|c| *c != '-').collect();
    let candidate = header.trim();
    let dash_ok = candidate.len() == 6 || (candidate.len() == 7 && candidate.as_bytes()[4] == b'-');
    if dash_ok && is_valid_year_month(&compact) {
        Some(compact)
    } else {
        None
    }
}

/// 表格行 → PlanEntry 列表
pub fn rows_to_plan_entries(rows: &[RawRow]) -> ImportResult<Vec<PlanEntry>> {
    let mut entries = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 2;
        let item = match first_value(row, ITEM_COLUMNS) {
            Some(item) => item,
            None => {
                tracing::debug!("计划导入: 行 {} 无品目代码，跳过", row_no);
                continue;
            }
        };

        let template = PlanEntry {
            item: item.to_string(),
            year_month: String::new(),
            quantity: 0.0,
            item_name: first_value(row, NAME_COLUMNS).unwrap_or_default().to_string(),
            item_desc: first_value(row, DESC_COLUMNS).unwrap_or_default().to_string(),
            line: first_value(row, LINE_COLUMNS).unwrap_or_default().to_string(),
        };

        if let Some(month_raw) = first_value(row, MONTH_COLUMNS) {
            // 长表
            let year_month = normalize_month_header(month_raw).ok_or_else(|| {
                ImportError::FieldMappingError {
                    row: row_no,
                    message: format!("月份格式错误: {}", month_raw),
                }
            })?;
            let (field, raw) = match first_entry(row, QUANTITY_COLUMNS) {
                Some(pair) => pair,
                None => continue,
            };
            let quantity = parse_quantity(raw, row_no, field)?;
            entries.push(PlanEntry {
                year_month,
                quantity,
                ..template
            });
            continue;
        }

        // 宽表
        let mut months: Vec<(String, &str, &String)> = row
            .iter()
            .filter_map(|(header, value)| {
                normalize_month_header(header).map(|ym| (ym, header.as_str(), value))
            })
            .collect();
        months.sort_by(|a, b| a.0.cmp(&b.0));

        for (year_month, header, value) in months {
            if value.trim().is_empty() {
                continue;
            }
            let quantity = parse_quantity(value, row_no, header)?;
            entries.push(PlanEntry {
                year_month,
                quantity,
                ..template.clone()
            });
        }
    }
    Ok(entries)
}

/// 工作天数粘贴: 首行为月份表头，第二行为天数；首列为标签
///
/// 无法解析的天数记为 0
pub fn parse_work_days_paste(text: &str) -> ImportResult<WorkDayCounts> {
    let mut lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());
    let (header_line, value_line) = match (lines.next(), lines.next()) {
        (Some(h), Some(v)) => (h, v),
        _ => {
            return Err(ImportError::EmptyInput(
                "需要表头行和天数行".to_string(),
            ))
        }
    };

    let headers: Vec<&str> = header_line.split('\t').collect();
    let values: Vec<&str> = value_line.split('\t').collect();

    let mut counts = WorkDayCounts::new();
    for (index, value) in values.iter().enumerate().skip(1) {
        let header = match headers.get(index) {
            Some(h) => h.trim(),
            None => continue,
        };
        if header.len() == 6 && is_valid_year_month(header) {
            counts.insert(header.to_string(), value.trim().parse::<u32>().unwrap_or(0));
        }
    }
    Ok(counts)
}

fn first_entry<'a>(row: &'a RawRow, columns: &[&'a str]) -> Option<(&'a str, &'a str)> {
    columns.iter().find_map(|col| {
        row.get(*col)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| (*col, v))
    })
}

fn first_value<'a>(row: &'a RawRow, columns: &[&'a str]) -> Option<&'a str> {
    first_entry(row, columns).map(|(_, v)| v)
}

fn parse_quantity(raw: &str, row: usize, field: &str) -> ImportResult<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != ' ').collect();
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("不是数字: {}", raw),
        })?;
    if value < 0.0 {
        return Err(ImportError::NegativeQuantity {
            row,
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_month_header_formats() {
        assert_eq!(normalize_month_header("202511"), Some("202511".to_string()));
        assert_eq!(normalize_month_header("2025-11"), Some("202511".to_string()));
        assert_eq!(normalize_month_header("2025-13"), None);
        assert_eq!(normalize_month_header("Item"), None);
        assert_eq!(normalize_month_header("20-2511"), None);
    }

    #[test]
    fn test_wide_layout() {
        let rows = vec![row(&[
            ("Item Code", "I1"),
            ("Item Name", "Belt"),
            ("Line", "313"),
            ("2025-04", "10"),
            ("202505", "1,200"),
            ("202506", ""),
        ])];
        let entries = rows_to_plan_entries(&rows).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].year_month, "202504");
        assert_eq!(entries[0].quantity, 10.0);
        assert_eq!(entries[1].quantity, 1200.0);
        assert_eq!(entries[1].item_name, "Belt");
        assert_eq!(entries[1].line, "313");
    }

    #[test]
    fn test_long_layout_and_skip_missing_item() {
        let rows = vec![
            row(&[("ITEM", "I1"), ("Month", "202511"), ("Quantity", "7.5")]),
            row(&[("ITEM", ""), ("Month", "202511"), ("Quantity", "1")]),
        ];
        let entries = rows_to_plan_entries(&rows).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key(), "I1_202511");
        assert_eq!(entries[0].quantity, 7.5);
    }

    #[test]
    fn test_non_numeric_quantity_names_row() {
        let rows = vec![
            row(&[("Item", "I1"), ("202511", "5")]),
            row(&[("Item", "I2"), ("202511", "abc")]),
        ];
        match rows_to_plan_entries(&rows) {
            Err(ImportError::TypeConversionError { row, field, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(field, "202511");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_work_days_paste() {
        let text = "Month\t202504\t202505\tNote\nDays\t21\tx\t5\n";
        let counts = parse_work_days_paste(text).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("202504"), Some(&21));
        assert_eq!(counts.get("202505"), Some(&0));

        assert!(parse_work_days_paste("Month\t202504").is_err());
    }
}
