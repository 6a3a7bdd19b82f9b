// ==========================================
// 工厂日报系统 - 表格解析
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / TSV (.tsv/.txt) / 粘贴文本
// 输出: 每行一个 表头 → 单元格 的映射（首行为表头）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行: 表头 → 单元格文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// Trait: FileParser
// ==========================================
pub trait FileParser: Send + Sync {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CSV / TSV Parser
// ==========================================
pub struct CsvParser {
    delimiter: u8,
}

impl CsvParser {
    pub fn comma() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tab() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = to_raw_row(&headers, record.iter());
            if row_is_blank(&row) {
                continue;
            }
            records.push(row);
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser（读取第一个工作表）
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let cells: Vec<String> = data_row.iter().map(|cell| cell.to_string()).collect();
            let row = to_raw_row(&headers, cells.iter().map(String::as_str));
            if row_is_blank(&row) {
                continue;
            }
            records.push(row);
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser::comma().parse_to_raw_records(path),
            "tsv" | "txt" => CsvParser::tab().parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// 粘贴文本（Tab 分隔，首行表头）
// ==========================================

/// 解析从表格软件复制的文本；首列为空的行跳过
pub fn parse_pasted_table(text: &str) -> ImportResult<Vec<RawRow>> {
    let mut lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| ImportError::EmptyInput("粘贴内容为空".to_string()))?;
    let headers: Vec<String> = header_line
        .split('\t')
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for line in lines {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.first().map_or(true, |c| c.trim().is_empty()) {
            continue;
        }
        records.push(to_raw_row(&headers, cells.into_iter()));
    }
    Ok(records)
}

fn to_raw_row<'a>(headers: &[String], cells: impl Iterator<Item = &'a str>) -> RawRow {
    let mut row = RawRow::new();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        row.insert(header.clone(), value.trim().to_string());
    }
    row
}

fn row_is_blank(row: &RawRow) -> bool {
    row.values().all(|v| v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_temp_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = csv_temp_file();
        writeln!(temp_file, "Item,202504,202505").unwrap();
        writeln!(temp_file, "I1,10,12").unwrap();
        writeln!(temp_file, "I2,3.5,").unwrap();

        let records = UniversalFileParser.parse(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Item"), Some(&"I1".to_string()));
        assert_eq!(records[1].get("202504"), Some(&"3.5".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser::comma().parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = csv_temp_file();
        writeln!(temp_file, "Item,Quantity").unwrap();
        writeln!(temp_file, "I1,2.5").unwrap();
        writeln!(temp_file, ",").unwrap();
        writeln!(temp_file, "I2,3.0").unwrap();

        let records = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = UniversalFileParser.parse("plan.pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_pasted_table() {
        let text = "Item\tItem Name\t202511\r\nI1\tBelt\t10\r\n\t\t\r\nI2\tRope\t4\n";
        let rows = parse_pasted_table(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Item Name"), Some(&"Belt".to_string()));
        assert_eq!(rows[1].get("202511"), Some(&"4".to_string()));

        assert!(matches!(parse_pasted_table("  \n"), Err(ImportError::EmptyInput(_))));
    }
}
