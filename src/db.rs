// ==========================================
// 工厂日报系统 - SQLite 连接初始化
// ==========================================
// 用途: 旧系统生产表 (F9H00) 的本地 SQLite 镜像
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少镜像同步写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 生产实绩镜像表名
pub const PRODUCTION_TABLE: &str = "production_daily";

/// 生产实绩镜像表结构
///
/// 列与旧系统查询的别名一一对应:
/// YEAR_MONTH / COMP_DAY / LINE1 / LINE2 / LN_NAME / PR / ITEM / ITEM1 / ITEM2 / ACT_PRO_QTY / UNIT
const PRODUCTION_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS production_daily (
    year_month TEXT NOT NULL,
    comp_day TEXT NOT NULL,
    line1 TEXT NOT NULL,
    line2 TEXT NOT NULL DEFAULT '',
    line_name TEXT NOT NULL DEFAULT '',
    shift_no TEXT,
    item TEXT NOT NULL,
    item_name TEXT NOT NULL DEFAULT '',
    item_desc TEXT NOT NULL DEFAULT '',
    act_qty REAL NOT NULL DEFAULT 0,
    unit TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_production_daily_month
  ON production_daily(year_month, line1);

CREATE INDEX IF NOT EXISTS idx_production_daily_day
  ON production_daily(comp_day);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 确保生产实绩镜像表存在（幂等）
pub fn ensure_production_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(PRODUCTION_TABLE_DDL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_production_table_幂等() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_production_table(&conn).unwrap();
        ensure_production_table(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [PRODUCTION_TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
