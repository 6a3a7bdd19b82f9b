// ==========================================
// 工厂日报系统 - SQLite 镜像数据源
// ==========================================
// 表: production_daily（旧系统生产表的本地镜像，见 db.rs）
// 约束:
// - 产线白名单 / 行数上限 / 报表月份窗口 由配置给出
// - 所有查询参数化
// - rusqlite 为同步 API，查询放在 spawn_blocking 中执行
// ==========================================

use crate::db::{ensure_production_table, open_sqlite_connection, PRODUCTION_TABLE};
use crate::domain::calendar::year_month;
use crate::domain::ProductionRecord;
use crate::engine::shaping::{aggregate_by_line_item_month, filter_iso_week};
use crate::source::{RowQuery, RowSource, SourceError, SourcePeriod, SourceResult};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SourceSettings - 数据源约束
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub line_codes: Vec<String>,     // 产线白名单（空 = 不限制）
    pub row_limit: usize,            // 0 = 不限制
    pub start_month: Option<String>, // 报表窗口起（YYYYMM，含）
    pub end_month: Option<String>,   // 报表窗口止（YYYYMM，含）
}

// ==========================================
// SqliteRowSource
// ==========================================
pub struct SqliteRowSource {
    conn: Arc<Mutex<Connection>>,
    settings: SourceSettings,
}

impl SqliteRowSource {
    /// 打开镜像数据库（表不存在时自动创建）
    pub fn open(db_path: &str, settings: SourceSettings) -> SourceResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", db_path, e)))?;
        ensure_production_table(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), settings))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, settings: SourceSettings) -> Self {
        Self { conn, settings }
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// 写入镜像行（镜像同步/测试数据准备）
    pub fn import_rows(&self, rows: &[ProductionRecord]) -> SourceResult<usize> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| SourceError::Unavailable(format!("锁获取失败: {}", e)))?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (year_month, comp_day, line1, line_name, shift_no, item, item_name, item_desc, act_qty, unit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                PRODUCTION_TABLE
            ))?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.year_month,
                    row.day,
                    row.line,
                    row.line_name,
                    row.shift,
                    row.item,
                    row.item_name,
                    row.item_desc,
                    row.quantity_actual,
                    row.unit,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

#[async_trait]
impl RowSource for SqliteRowSource {
    async fn fetch(&self, query: &RowQuery) -> SourceResult<Vec<ProductionRecord>> {
        let conn = Arc::clone(&self.conn);
        let settings = self.settings.clone();
        let query = query.clone();

        let rows = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| SourceError::Unavailable(format!("锁获取失败: {}", e)))?;
            select_rows(&conn, &settings, &query)
        })
        .await
        .map_err(|e| SourceError::Unavailable(format!("查询任务异常: {}", e)))??;

        tracing::debug!("镜像数据源返回 {} 行", rows.len());
        Ok(rows)
    }
}

// ==========================================
// SQL 组装与执行
// ==========================================

fn select_rows(
    conn: &Connection,
    settings: &SourceSettings,
    query: &RowQuery,
) -> SourceResult<Vec<ProductionRecord>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    match &query.period {
        SourcePeriod::Month { year, month } => {
            clauses.push("year_month = ?".to_string());
            params.push(Value::Text(year_month(*year, *month)));
        }
        SourcePeriod::DateRange { start, end } => {
            clauses.push("comp_day BETWEEN ? AND ?".to_string());
            params.push(Value::Text(start.clone()));
            params.push(Value::Text(end.clone()));
        }
    }

    push_in_clause(&mut clauses, &mut params, "line1", &settings.line_codes);
    push_in_clause(&mut clauses, &mut params, "line1", &query.lines);

    if let Some(start) = &settings.start_month {
        clauses.push("year_month >= ?".to_string());
        params.push(Value::Text(start.clone()));
    }
    if let Some(end) = &settings.end_month {
        clauses.push("year_month <= ?".to_string());
        params.push(Value::Text(end.clone()));
    }

    let mut sql = format!(
        "SELECT year_month, comp_day, line1, line_name, shift_no, item, item_name, item_desc, act_qty, unit
         FROM {} WHERE {} ORDER BY comp_day DESC, line1, item",
        PRODUCTION_TABLE,
        clauses.join(" AND ")
    );
    if settings.row_limit > 0 {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(settings.row_limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows: Vec<ProductionRecord> = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(ProductionRecord {
                year_month: row.get(0)?,
                day: row.get(1)?,
                line: row.get(2)?,
                line_name: row.get(3)?,
                shift: row.get(4)?,
                item: row.get(5)?,
                item_name: row.get(6)?,
                item_desc: row.get(7)?,
                quantity_actual: row.get(8)?,
                unit: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(week) = query.week {
        rows = filter_iso_week(rows, week);
    }
    if !query.detailed {
        rows = aggregate_by_line_item_month(rows);
    }
    Ok(rows)
}

fn push_in_clause(clauses: &mut Vec<String>, params: &mut Vec<Value>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    clauses.push(format!("{} IN ({})", column, placeholders));
    params.extend(values.iter().map(|v| Value::Text(v.clone())));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: &str, line: &str, item: &str, qty: f64) -> ProductionRecord {
        ProductionRecord {
            year_month: day[..6].to_string(),
            day: day.to_string(),
            line: line.to_string(),
            line_name: String::new(),
            shift: Some("1".to_string()),
            item: item.to_string(),
            item_name: String::new(),
            item_desc: String::new(),
            quantity_actual: qty,
            unit: "M".to_string(),
        }
    }

    fn source(settings: SourceSettings) -> SqliteRowSource {
        let conn = Connection::open_in_memory().unwrap();
        ensure_production_table(&conn).unwrap();
        let source = SqliteRowSource::from_connection(Arc::new(Mutex::new(conn)), settings);
        source
            .import_rows(&[
                record("20251103", "313", "A", 10.0),
                record("20251104", "312", "B", 20.0),
                record("20251104", "999", "C", 30.0),
                record("20251201", "313", "A", 40.0),
            ])
            .unwrap();
        source
    }

    #[tokio::test]
    async fn test_month_query_applies_allowlist() {
        let source = source(SourceSettings {
            line_codes: vec!["313".to_string(), "312".to_string()],
            ..SourceSettings::default()
        });
        let rows = source.fetch(&RowQuery::month(2025, 11)).await.unwrap();
        assert_eq!(rows.len(), 2);
        // 按日期倒序
        assert_eq!(rows[0].day, "20251104");
    }

    #[tokio::test]
    async fn test_date_range_and_line_filter() {
        let source = source(SourceSettings::default());
        let rows = source
            .fetch(&RowQuery::date_range("20251101", "20251231").with_lines(vec!["313".to_string()]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.line == "313"));
    }

    #[tokio::test]
    async fn test_row_limit_and_month_window() {
        let source = source(SourceSettings {
            row_limit: 1,
            ..SourceSettings::default()
        });
        let rows = source.fetch(&RowQuery::month(2025, 11)).await.unwrap();
        assert_eq!(rows.len(), 1);

        let windowed = source_with_window();
        let rows = windowed.fetch(&RowQuery::month(2025, 12)).await.unwrap();
        assert!(rows.is_empty());
    }

    fn source_with_window() -> SqliteRowSource {
        source(SourceSettings {
            end_month: Some("202511".to_string()),
            ..SourceSettings::default()
        })
    }

    #[tokio::test]
    async fn test_empty_period_returns_empty() {
        let source = source(SourceSettings::default());
        let rows = source.fetch(&RowQuery::month(2024, 1)).await.unwrap();
        assert!(rows.is_empty());
    }
}
