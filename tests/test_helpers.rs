// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供可控的模拟数据源、实绩行构造、AppState 装配
// ==========================================

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use daily_report::app::AppState;
use daily_report::config::AppConfig;
use daily_report::domain::calendar::year_month;
use daily_report::repository::{DocumentStorage, MemoryStorage};
use daily_report::source::{RowQuery, RowSource, SourceError, SourcePeriod, SourceResult};
use daily_report::ProductionRecord;
use tokio::sync::Semaphore;

// ==========================================
// MockSource - 模拟旧系统生产表
// ==========================================
#[derive(Default)]
pub struct MockSource {
    rows: Mutex<Vec<ProductionRecord>>,
    failing_months: Mutex<HashSet<String>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<ProductionRecord>) -> Self {
        let source = Self::new();
        source.set_rows(rows);
        source
    }

    /// 每次拉取需先拿到许可；返回的信号量初始为 0 个许可
    pub fn gated(rows: Vec<ProductionRecord>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let source = Self {
            gate: Some(gate.clone()),
            ..Self::with_rows(rows)
        };
        (source, gate)
    }

    pub fn set_rows(&self, rows: Vec<ProductionRecord>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn push_row(&self, row: ProductionRecord) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn fail_month(&self, ym: &str) {
        self.failing_months.lock().unwrap().insert(ym.to_string());
    }

    pub fn fail_all(&self, months: &[(i32, u32)]) {
        for (year, month) in months {
            self.fail_month(&year_month(*year, *month));
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for MockSource {
    async fn fetch(&self, query: &RowQuery) -> SourceResult<Vec<ProductionRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = match &self.gate {
            Some(gate) => Some(
                gate.acquire()
                    .await
                    .map_err(|e| SourceError::Unavailable(e.to_string()))?,
            ),
            None => None,
        };

        let rows = self.rows.lock().unwrap().clone();
        let selected = match &query.period {
            SourcePeriod::Month { year, month } => {
                let ym = year_month(*year, *month);
                if self.failing_months.lock().unwrap().contains(&ym) {
                    return Err(SourceError::Query(format!("{} 查询失败", ym)));
                }
                rows.into_iter().filter(|r| r.year_month == ym).collect::<Vec<_>>()
            }
            SourcePeriod::DateRange { start, end } => rows
                .into_iter()
                .filter(|r| r.day.as_str() >= start.as_str() && r.day.as_str() <= end.as_str())
                .collect(),
        };

        Ok(selected
            .into_iter()
            .filter(|r| query.lines.is_empty() || query.lines.contains(&r.line))
            .collect())
    }
}

// ==========================================
// 实绩行构造
// ==========================================

pub fn record(day: &str, line: &str, item: &str, qty: f64) -> ProductionRecord {
    ProductionRecord {
        year_month: day[..6].to_string(),
        day: day.to_string(),
        line: line.to_string(),
        line_name: format!("Line {}", line),
        shift: None,
        item: item.to_string(),
        item_name: format!("{} name", item),
        item_desc: String::new(),
        quantity_actual: qty,
        unit: if line == "312" { "KG" } else { "M" }.to_string(),
    }
}

pub fn record_with_shift(day: &str, line: &str, item: &str, qty: f64, shift: &str) -> ProductionRecord {
    ProductionRecord {
        shift: Some(shift.to_string()),
        ..record(day, line, item, qty)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// AppState 装配（内存存储 + 模拟数据源）
// ==========================================

pub fn test_state(source: Arc<MockSource>) -> (Arc<MemoryStorage>, Arc<AppState>) {
    test_state_with_config(source, AppConfig::default())
}

pub fn test_state_with_config(
    source: Arc<MockSource>,
    config: AppConfig,
) -> (Arc<MemoryStorage>, Arc<AppState>) {
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::with_backends(
        config,
        storage.clone() as Arc<dyn DocumentStorage>,
        source as Arc<dyn RowSource>,
    );
    (storage, Arc::new(state))
}
