// ==========================================
// 工厂日报系统 - 引擎层
// ==========================================
// 红线: 引擎不直接读写文件，持久化经由 repository
// ==========================================
// 模块:
// - reconciler: 缓存对账（全量 / 增量 / 快照）
// - refresh_scheduler: 定时刷新
// - query: 期间查询与数据源回退
// - enrichment: 计划/达成率/注释/假日补全
// - pivot: 月度透视表
// - shaping: 实绩行合并/汇总/周过滤
// - work_day_validation: 工作天数对账
// ==========================================

pub mod enrichment;
pub mod pivot;
pub mod query;
pub mod reconciler;
pub mod refresh_scheduler;
pub mod shaping;
pub mod work_day_validation;

pub use enrichment::{percentage, summarize, EnrichedRecord, PlanContext, ProductionSummary};
pub use pivot::{LineTotal, PivotBuilder, PivotCell, PivotRow, PivotTable, UpToTotals};
pub use query::{LineFilter, PeriodRequest, ProductionQuery, QueryEngine, QueryOrigin, QueryResult};
pub use reconciler::{CacheReconciler, CacheState, CacheStatus, CacheView, RefreshOutcome};
pub use refresh_scheduler::spawn_refresh_loop;
pub use work_day_validation::{
    validate_work_days, MonthCheck, MonthCheckStatus, WorkDayValidationReport,
};
