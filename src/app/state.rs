// ==========================================
// 工厂日报系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{CalendarApi, CommentApi, PlanApi, ProductionApi};
use crate::config::AppConfig;
use crate::engine::CacheReconciler;
use crate::repository::{DocumentStorage, FileStorage, SideStores, SnapshotRepository};
use crate::source::sqlite_source::SqliteRowSource;
use crate::source::RowSource;

/// 应用状态
///
/// 包含所有API实例和共享资源，由 axum 路由以 Arc<AppState> 共享
pub struct AppState {
    /// 运行配置
    pub config: AppConfig,

    /// 缓存对账器（后台刷新循环与 API 共用）
    pub reconciler: Arc<CacheReconciler>,

    /// 生产实绩API
    pub production_api: Arc<ProductionApi>,

    /// 计划API
    pub plan_api: Arc<PlanApi>,

    /// 日历API
    pub calendar_api: Arc<CalendarApi>,

    /// 注释API
    pub comment_api: Arc<CommentApi>,
}

impl AppState {
    /// 按配置创建AppState
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 在数据目录上打开文件存储
    /// 2. 打开生产表镜像（SQLite）作为数据源
    /// 3. 装配缓存对账器和全部API
    pub fn new(config: AppConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据目录: {}", config.data_dir.display());

        let storage = FileStorage::new(&config.data_dir)
            .map_err(|e| format!("无法打开数据目录: {}", e))?;

        let db_path = config.source_db_path();
        let source = SqliteRowSource::open(&db_path.to_string_lossy(), config.source_settings())
            .map_err(|e| format!("无法打开生产表镜像: {}", e))?;
        tracing::info!("生产表镜像: {}", db_path.display());

        Ok(Self::with_backends(config, Arc::new(storage), Arc::new(source)))
    }

    /// 以给定的存储后端和数据源装配（测试中注入内存实现）
    pub fn with_backends(
        config: AppConfig,
        storage: Arc<dyn DocumentStorage>,
        source: Arc<dyn RowSource>,
    ) -> Self {
        let reconciler = Arc::new(
            CacheReconciler::new(source, SnapshotRepository::new(storage.clone()))
                .with_source_timeout(config.source_timeout()),
        );
        let stores = Arc::new(SideStores::new(storage));

        let production_api = Arc::new(ProductionApi::new(
            reconciler.clone(),
            stores.clone(),
            &config.kg_line_code,
            &config.primary_line_code,
            config.default_work_days,
        ));
        let plan_api = Arc::new(PlanApi::new(stores.clone()));
        let calendar_api = Arc::new(CalendarApi::new(stores.clone()));
        let comment_api = Arc::new(CommentApi::new(stores));

        Self {
            config,
            reconciler,
            production_api,
            plan_api,
            calendar_api,
            comment_api,
        }
    }
}
