// ==========================================
// 工厂日报系统 - 定时刷新
// ==========================================
// tokio interval 驱动 CacheReconciler::refresh
// 单次失败只跳过该周期；上一轮未结束时不叠加执行
// ==========================================

use crate::engine::reconciler::{CacheReconciler, RefreshOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 启动后台刷新循环
///
/// 第一次 tick 立即触发，用于启动时的全量加载
pub fn spawn_refresh_loop(reconciler: Arc<CacheReconciler>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("自动刷新已启动: 每 {} 秒", period.as_secs());

        loop {
            ticker.tick().await;
            match reconciler.refresh().await {
                RefreshOutcome::SourceFailed { run_id, error } => {
                    tracing::warn!("本轮刷新失败，等待下一周期: run_id={}, {}", run_id, error);
                }
                RefreshOutcome::Skipped => {
                    tracing::debug!("本轮刷新跳过");
                }
                _ => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductionRecord;
    use crate::engine::reconciler::CacheState;
    use crate::repository::{MemoryStorage, SnapshotRepository};
    use crate::source::{RowQuery, RowSource, SourceResult};
    use async_trait::async_trait;

    struct EmptySource;

    #[async_trait]
    impl RowSource for EmptySource {
        async fn fetch(&self, _query: &RowQuery) -> SourceResult<Vec<ProductionRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_loop_warms_cache() {
        let reconciler = Arc::new(CacheReconciler::new(
            Arc::new(EmptySource),
            SnapshotRepository::new(Arc::new(MemoryStorage::new())),
        ));
        let handle = spawn_refresh_loop(reconciler.clone(), Duration::from_secs(3600));

        for _ in 0..100 {
            if reconciler.state() == CacheState::Warm {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert_eq!(reconciler.state(), CacheState::Warm);
    }
}
