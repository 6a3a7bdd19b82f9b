// ==========================================
// 工厂日报系统 - 缓存对账器
// ==========================================
// 职责: 维护旧系统生产表在本地的镜像（内存 + 快照文件）
// 状态机: Cold → Warming → Warm
// - Cold: 未完成全量加载（进程启动 / 手动清空 / 快照仅作预热）
// - Warming: 全量加载进行中，并发的刷新直接返回 Skipped
// - Warm: 每次刷新只拉取当月，按内容比较覆盖
// 业务键: (day, item, line)；同键多班次求和
// 财年切换: 今天所在财年与上次全量加载不同 → 重新全量加载
// ==========================================

use crate::domain::calendar::year_month;
use crate::domain::{CacheSnapshot, FiscalYear, ProductionRecord, RecordKey};
use crate::engine::shaping::fold_by_key;
use crate::repository::{RepositoryResult, SnapshotRepository};
use crate::source::{RowQuery, RowSource, SourceError, SourceResult};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

/// 默认数据源超时
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(60);

// ==========================================
// CacheState - 缓存状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Cold,
    Warming,
    Warm,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Cold => "cold",
            CacheState::Warming => "warming",
            CacheState::Warm => "warm",
        }
    }
}

// ==========================================
// RefreshOutcome - 单次刷新结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RefreshOutcome {
    /// 财年全量加载
    #[serde(rename_all = "camelCase")]
    FullLoad {
        run_id: String,
        fiscal_year: i32,
        total_records: usize,
        failed_months: Vec<String>,
    },
    /// 当月增量刷新
    #[serde(rename_all = "camelCase")]
    Incremental {
        run_id: String,
        year_month: String,
        fetched: usize,
        changed: usize,
    },
    /// 已有全量加载在进行
    Skipped,
    /// 数据源失败，缓存保持不变
    #[serde(rename_all = "camelCase")]
    SourceFailed { run_id: String, error: String },
}

// ==========================================
// CacheView / CacheStatus - 只读视图
// ==========================================
#[derive(Debug, Clone)]
pub struct CacheView {
    pub records: Vec<ProductionRecord>,
    pub last_update: Option<DateTime<Utc>>,
    pub state: CacheState,
    pub fiscal_year: Option<FiscalYear>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub state: CacheState,
    pub total_records: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub fiscal_year: Option<i32>,
    pub fiscal_period: Option<String>,
}

struct CacheInner {
    records: BTreeMap<RecordKey, ProductionRecord>,
    last_update: Option<DateTime<Utc>>,
    fiscal_year: Option<FiscalYear>,
    state: CacheState,
}

// ==========================================
// CacheReconciler
// ==========================================
pub struct CacheReconciler {
    source: Arc<dyn RowSource>,
    snapshots: SnapshotRepository,
    inner: RwLock<CacheInner>,
    loading: AtomicBool,
    source_timeout: Duration,
}

impl CacheReconciler {
    pub fn new(source: Arc<dyn RowSource>, snapshots: SnapshotRepository) -> Self {
        Self {
            source,
            snapshots,
            inner: RwLock::new(CacheInner {
                records: BTreeMap::new(),
                last_update: None,
                fiscal_year: None,
                state: CacheState::Cold,
            }),
            loading: AtomicBool::new(false),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    // ==========================================
    // 快照加载
    // ==========================================

    /// 从快照文件预热内存缓存，返回载入条数
    ///
    /// 快照损坏时记录错误并以空缓存继续；状态保持 Cold，等待全量加载
    pub fn load_snapshot(&self) -> usize {
        let snapshot = match self.snapshots.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::info!("快照文件不存在，以空缓存启动: {}", self.snapshots.location());
                return 0;
            }
            Err(e) => {
                tracing::error!("快照文件损坏，以空缓存启动: {}", e);
                return 0;
            }
        };

        let records = fold_by_key(snapshot.records);
        let count = records.len();
        let mut inner = self.write_inner();
        inner.records = records;
        inner.last_update = snapshot.last_update;
        inner.fiscal_year = snapshot.fiscal_year.map(FiscalYear);
        tracing::info!("已从快照载入 {} 条记录", count);
        count
    }

    // ==========================================
    // 刷新
    // ==========================================

    /// 以当前本地日期刷新
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_at(Local::now().date_naive()).await
    }

    /// 以指定日期刷新
    ///
    /// 未完成全量加载或财年已切换 → 全量加载；否则只拉取当月
    pub async fn refresh_at(&self, today: NaiveDate) -> RefreshOutcome {
        let fiscal_year = FiscalYear::containing(today);
        let (state, loaded_year) = {
            let inner = self.read_inner();
            (inner.state, inner.fiscal_year)
        };

        if state != CacheState::Warm {
            return self.initial_load(today).await;
        }
        if loaded_year != Some(fiscal_year) {
            tracing::info!("财年切换 {:?} → FY{}，重新全量加载", loaded_year, fiscal_year.0);
            return self.initial_load(today).await;
        }

        self.incremental_refresh(today).await
    }

    /// 财年全量加载（12 个月并发拉取）
    pub async fn initial_load(&self, today: NaiveDate) -> RefreshOutcome {
        let _guard = match LoadingGuard::acquire(self) {
            Some(guard) => guard,
            None => {
                tracing::debug!("全量加载进行中，跳过本次刷新");
                return RefreshOutcome::Skipped;
            }
        };

        let run_id = Uuid::new_v4().to_string();
        let fiscal_year = FiscalYear::containing(today);
        tracing::info!(
            "开始全量加载: run_id={}, FY{} ({})",
            run_id,
            fiscal_year.0,
            fiscal_year.period_label()
        );

        let months = fiscal_year.months();
        let fetches = months.iter().map(|&(year, month)| async move {
            let query = RowQuery::month(year, month);
            (year_month(year, month), self.fetch_with_timeout(&query).await)
        });
        let results = join_all(fetches).await;

        let mut rows: Vec<ProductionRecord> = Vec::new();
        let mut failed_months: Vec<String> = Vec::new();
        for (ym, result) in results {
            match result {
                Ok(month_rows) => {
                    tracing::debug!("run_id={}, {} 返回 {} 行", run_id, ym, month_rows.len());
                    rows.extend(month_rows);
                }
                Err(e) => {
                    tracing::warn!("run_id={}, {} 拉取失败，按 0 行处理: {}", run_id, ym, e);
                    failed_months.push(ym);
                }
            }
        }

        if failed_months.len() == months.len() {
            tracing::error!("run_id={}, 全部月份拉取失败，保留现有缓存", run_id);
            return RefreshOutcome::SourceFailed {
                run_id,
                error: "all fiscal-year months failed".to_string(),
            };
        }

        let total_records = {
            let mut fresh = fold_by_key(rows);
            let mut inner = self.write_inner();
            // 拉取失败的月份沿用已有记录
            let failed: HashSet<&str> = failed_months.iter().map(String::as_str).collect();
            for (key, record) in inner.records.iter() {
                if failed.contains(record.year_month.as_str()) {
                    fresh.insert(key.clone(), record.clone());
                }
            }
            inner.records = fresh;
            inner.fiscal_year = Some(fiscal_year);
            inner.last_update = Some(Utc::now());
            inner.state = CacheState::Warm;
            inner.records.len()
        };

        tracing::info!(
            "全量加载完成: run_id={}, FY{}, 共 {} 条, 失败月份 {:?}",
            run_id,
            fiscal_year.0,
            total_records,
            failed_months
        );
        self.persist_logged();

        RefreshOutcome::FullLoad {
            run_id,
            fiscal_year: fiscal_year.0,
            total_records,
            failed_months,
        }
    }

    async fn incremental_refresh(&self, today: NaiveDate) -> RefreshOutcome {
        let run_id = Uuid::new_v4().to_string();
        let ym = year_month(today.year(), today.month());
        let query = RowQuery::month(today.year(), today.month());

        let rows = match self.fetch_with_timeout(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("增量刷新失败，保留现有缓存: run_id={}, {}: {}", run_id, ym, e);
                return RefreshOutcome::SourceFailed {
                    run_id,
                    error: e.to_string(),
                };
            }
        };

        let fetched = rows.len();
        let changed = {
            let mut inner = self.write_inner();
            let mut changed = 0;
            for (key, record) in fold_by_key(rows) {
                let differs = match inner.records.get(&key) {
                    Some(existing) => existing.quantity_actual != record.quantity_actual,
                    None => true,
                };
                if differs {
                    inner.records.insert(key, record);
                    changed += 1;
                }
            }
            inner.last_update = Some(Utc::now());
            changed
        };

        if changed > 0 {
            tracing::info!("增量刷新: run_id={}, {} 更新 {} 条", run_id, ym, changed);
            self.persist_logged();
        } else {
            tracing::debug!("增量刷新: run_id={}, {} 无变化", run_id, ym);
        }

        RefreshOutcome::Incremental {
            run_id,
            year_month: ym,
            fetched,
            changed,
        }
    }

    // ==========================================
    // 持久化 / 清空
    // ==========================================

    /// 写入快照文件（整份，临时文件 + rename）
    pub fn persist(&self) -> RepositoryResult<()> {
        let snapshot = {
            let inner = self.read_inner();
            CacheSnapshot {
                records: inner.records.values().cloned().collect(),
                fiscal_year: inner.fiscal_year.map(|fy| fy.0),
                fiscal_period: inner.fiscal_year.map(|fy| fy.period_label()),
                last_update: inner.last_update,
                total_records: inner.records.len(),
            }
        };
        self.snapshots.save(&snapshot)
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            tracing::error!("快照写入失败，内存与磁盘暂不一致: {}", e);
        }
    }

    /// 手动清空缓存（状态回到 Cold）
    pub fn clear(&self) {
        {
            let mut inner = self.write_inner();
            inner.records.clear();
            inner.last_update = None;
            inner.fiscal_year = None;
            if inner.state == CacheState::Warm {
                inner.state = CacheState::Cold;
            }
        }
        tracing::info!("缓存已清空");
        self.persist_logged();
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 内存快照（无 I/O）
    pub fn snapshot(&self) -> CacheView {
        let inner = self.read_inner();
        CacheView {
            records: inner.records.values().cloned().collect(),
            last_update: inner.last_update,
            state: inner.state,
            fiscal_year: inner.fiscal_year,
        }
    }

    /// 按条件筛选缓存记录
    pub fn records_where<F>(&self, predicate: F) -> Vec<ProductionRecord>
    where
        F: Fn(&ProductionRecord) -> bool,
    {
        let inner = self.read_inner();
        inner
            .records
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub fn status(&self) -> CacheStatus {
        let inner = self.read_inner();
        CacheStatus {
            state: inner.state,
            total_records: inner.records.len(),
            last_update: inner.last_update,
            fiscal_year: inner.fiscal_year.map(|fy| fy.0),
            fiscal_period: inner.fiscal_year.map(|fy| fy.period_label()),
        }
    }

    pub fn state(&self) -> CacheState {
        self.read_inner().state
    }

    pub fn len(&self) -> usize {
        self.read_inner().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 直接查询数据源（缓存未命中时的回退）
    pub async fn fetch_direct(&self, query: &RowQuery) -> SourceResult<Vec<ProductionRecord>> {
        self.fetch_with_timeout(query).await
    }

    // ==========================================
    // 内部
    // ==========================================

    async fn fetch_with_timeout(&self, query: &RowQuery) -> SourceResult<Vec<ProductionRecord>> {
        match tokio::time::timeout(self.source_timeout, self.source.fetch(query)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.source_timeout.as_secs())),
        }
    }

    // 写锁内只做内存操作，不会在持锁期间 panic；中毒时沿用内部数据
    fn read_inner(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ==========================================
// LoadingGuard - 全量加载互斥
// ==========================================
// 释放时复位 loading 标志；若加载未完成（被取消/提前返回），状态退回加载前
struct LoadingGuard<'a> {
    reconciler: &'a CacheReconciler,
    previous: CacheState,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(reconciler: &'a CacheReconciler) -> Option<Self> {
        reconciler
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let previous = {
            let mut inner = reconciler.write_inner();
            let previous = inner.state;
            inner.state = CacheState::Warming;
            previous
        };
        Some(Self {
            reconciler,
            previous,
        })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        {
            let mut inner = self.reconciler.write_inner();
            if inner.state == CacheState::Warming {
                inner.state = self.previous;
            }
        }
        self.reconciler.loading.store(false, Ordering::Release);
    }
}
