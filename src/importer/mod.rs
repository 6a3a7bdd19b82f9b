// ==========================================
// 工厂日报系统 - 导入层
// ==========================================
// 职责: 表格数据（文件 / 粘贴文本）→ 计划条目、工作天数
// 支持: Excel, CSV, TSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod plan_import;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{
    parse_pasted_table, CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser,
};
pub use plan_import::{normalize_month_header, parse_work_days_paste, rows_to_plan_entries};
