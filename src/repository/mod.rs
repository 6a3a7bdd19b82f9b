// ==========================================
// 工厂日报系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 侧存储 JSON 文档与缓存快照的读写
// 约束: 整份写入走 "临时文件 + rename"，读者不会看到半份文档
// ==========================================

pub mod calendar_repo;
pub mod comment_repo;
pub mod document_store;
pub mod error;
pub mod plan_repo;
pub mod snapshot_repo;
pub mod storage;

// 重导出核心仓储
pub use calendar_repo::{HolidayRepository, WorkDayRepository, WorkingDayRepository};
pub use comment_repo::CommentRepository;
pub use document_store::{JsonDocumentStore, KeyValueStore};
pub use error::{RepositoryError, RepositoryResult};
pub use plan_repo::{OverrideRepository, PlanRepository};
pub use snapshot_repo::SnapshotRepository;
pub use storage::{DocumentStorage, FileStorage, MemoryStorage};

use std::sync::Arc;

// ==========================================
// SideStores - 侧存储集合
// ==========================================
// 同一存储后端上的全部侧存储，由 AppState 持有
pub struct SideStores {
    pub comments: CommentRepository,
    pub plans: PlanRepository,
    pub overrides: OverrideRepository,
    pub work_days: WorkDayRepository,
    pub holidays: HolidayRepository,
    pub working_days: WorkingDayRepository,
}

impl SideStores {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            comments: CommentRepository::new(storage.clone()),
            plans: PlanRepository::new(storage.clone()),
            overrides: OverrideRepository::new(storage.clone()),
            work_days: WorkDayRepository::new(storage.clone()),
            holidays: HolidayRepository::new(storage.clone()),
            working_days: WorkingDayRepository::new(storage),
        }
    }
}
