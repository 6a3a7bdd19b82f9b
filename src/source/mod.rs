// ==========================================
// 工厂日报系统 - 数据源层 (Row Source)
// ==========================================
// 职责: 按 年月 / 日期区间 / 周 / 产线 返回生产实绩行
// 约定: 无数据的期间返回空列表，不返回错误
// ==========================================

pub mod sqlite_source;

pub use sqlite_source::{SourceSettings, SqliteRowSource};

use crate::domain::calendar::year_month;
use crate::domain::ProductionRecord;
use async_trait::async_trait;
use thiserror::Error;

// ==========================================
// SourcePeriod - 查询期间
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePeriod {
    /// 自然月
    Month { year: i32, month: u32 },
    /// 日期区间 YYYYMMDD（含两端）
    DateRange { start: String, end: String },
}

impl SourcePeriod {
    pub fn month(year: i32, month: u32) -> Self {
        SourcePeriod::Month { year, month }
    }

    /// 日志用描述
    pub fn label(&self) -> String {
        match self {
            SourcePeriod::Month { year, month } => year_month(*year, *month),
            SourcePeriod::DateRange { start, end } => format!("{}..{}", start, end),
        }
    }
}

// ==========================================
// RowQuery - 查询参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub period: SourcePeriod,
    pub week: Option<u32>,     // ISO 周序号
    pub detailed: bool,        // false: 按 产线+品目+年月 汇总
    pub lines: Vec<String>,    // 空 = 不过滤（仍受白名单约束）
}

impl RowQuery {
    /// 明细行查询（对账器使用）
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            period: SourcePeriod::month(year, month),
            week: None,
            detailed: true,
            lines: Vec::new(),
        }
    }

    pub fn date_range(start: &str, end: &str) -> Self {
        Self {
            period: SourcePeriod::DateRange {
                start: start.to_string(),
                end: end.to_string(),
            },
            week: None,
            detailed: true,
            lines: Vec::new(),
        }
    }

    pub fn with_week(mut self, week: Option<u32>) -> Self {
        self.week = week;
        self
    }

    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn with_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }
}

// ==========================================
// SourceError - 数据源错误
// ==========================================
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("数据源不可用: {0}")]
    Unavailable(String),

    #[error("数据源查询失败: {0}")]
    Query(String),

    #[error("数据源查询超时 ({0} 秒)")]
    Timeout(u64),
}

impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        SourceError::Query(err.to_string())
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

// ==========================================
// Trait: RowSource
// ==========================================
// 实现者: SqliteRowSource（旧系统生产表镜像）；测试中的内存实现
#[async_trait]
pub trait RowSource: Send + Sync {
    /// 拉取生产实绩
    ///
    /// # 返回
    /// - Ok(rows): 期间内的行（无数据时为空）
    /// - Err: 连接/查询失败
    async fn fetch(&self, query: &RowQuery) -> SourceResult<Vec<ProductionRecord>>;
}
