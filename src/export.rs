// ==========================================
// 工厂日报系统 - CSV 导出
// ==========================================
// 列: YEAR_MONTH, COMP_DAY, LINE, ITEM, ITEM_NAME, UNIT,
//     PLAN_QTY, ACT_QTY, PERCENTAGE, COMMENT, HOLIDAY
// ==========================================

use crate::engine::EnrichedRecord;
use anyhow::Context;

pub const CSV_HEADERS: [&str; 11] = [
    "YEAR_MONTH",
    "COMP_DAY",
    "LINE",
    "ITEM",
    "ITEM_NAME",
    "UNIT",
    "PLAN_QTY",
    "ACT_QTY",
    "PERCENTAGE",
    "COMMENT",
    "HOLIDAY",
];

/// 导出补全后的实绩行
pub fn render_csv(records: &[EnrichedRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for enriched in records {
        let r = &enriched.record;
        let plan = enriched.plan_quantity.to_string();
        let actual = r.quantity_actual.to_string();
        let percent = format!("{:.2}", enriched.percentage);
        writer.write_record([
            r.year_month.as_str(),
            r.day.as_str(),
            r.line.as_str(),
            r.item.as_str(),
            r.item_name.as_str(),
            r.unit.as_str(),
            plan.as_str(),
            actual.as_str(),
            percent.as_str(),
            enriched.comment.as_str(),
            enriched.holiday_name.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner().context("CSV 缓冲区写入失败")?;
    String::from_utf8(bytes).context("CSV 内容不是有效 UTF-8")
}

/// 导出文件名，如 production_202511.csv
pub fn export_file_name(label: &str) -> String {
    let safe: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("production_{}.csv", safe)
}
