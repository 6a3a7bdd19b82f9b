// ==========================================
// 工厂日报系统 - 核心库
// ==========================================
// 技术栈: axum + tokio + JSON 文档存储 + SQLite 镜像
// 系统定位: 计划/实绩对比看板 (缓存对账 + 侧存储 CRUD)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - JSON 文档 / 快照
pub mod repository;

// 数据源层 - 旧系统生产表
pub mod source;

// 引擎层 - 缓存对账 / 查询 / 展示
pub mod engine;

// 导入层 - 计划表格
pub mod importer;

// 导出层 - CSV
pub mod export;

// 配置层
pub mod config;

// 数据库基础设施（SQLite 镜像连接）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    CacheSnapshot, FiscalYear, HolidayEntry, ManualOverride, PlanEntry, ProductionRecord,
    RecordKey,
};

pub use engine::{
    CacheReconciler, CacheState, CacheView, PeriodRequest, QueryEngine, QueryOrigin,
    RefreshOutcome,
};

pub use api::{CalendarApi, CommentApi, PlanApi, ProductionApi};

pub use config::AppConfig;

pub use source::{RowQuery, RowSource, SourceError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Daily Production Report";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
