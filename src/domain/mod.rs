// ==========================================
// 工厂日报系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、业务键、日历/财年规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod calendar;
pub mod plan;
pub mod production;
pub mod snapshot;

// 重导出核心类型
pub use calendar::{FiscalYear, HolidayEntry, WorkDayCounts};
pub use plan::{plan_key, ManualOverride, PlanEntry, StoredPlan};
pub use production::{ProductionRecord, RecordKey};
pub use snapshot::{CacheSnapshot, SnapshotDocument};
