// ==========================================
// 工厂日报系统 - 计划/覆写仓储
// ==========================================
// 文档:
// - plan_data.json: "<item>_<yearMonth>" → PlanEntry（兼容旧的纯数字值）
// - est_qty_overrides.json: "<item>_<yearMonth>" → 覆写数量
// ==========================================

use crate::domain::{plan_key, ManualOverride, PlanEntry, StoredPlan};
use crate::repository::document_store::KeyValueStore;
use crate::repository::error::RepositoryResult;
use crate::repository::storage::DocumentStorage;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PLAN_DOCUMENT: &str = "plan_data.json";
pub const OVERRIDE_DOCUMENT: &str = "est_qty_overrides.json";

// ==========================================
// PlanRepository - 月度计划
// ==========================================
pub struct PlanRepository {
    store: KeyValueStore<StoredPlan>,
}

impl PlanRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            store: KeyValueStore::new(storage, PLAN_DOCUMENT),
        }
    }

    /// 全部计划（键 → PlanEntry）
    pub fn list_plans(&self) -> RepositoryResult<BTreeMap<String, PlanEntry>> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .map(|(key, stored)| {
                let entry = stored.into_entry(&key);
                (key, entry)
            })
            .collect())
    }

    pub fn get_plan(&self, item: &str, year_month: &str) -> RepositoryResult<Option<PlanEntry>> {
        let key = plan_key(item, year_month);
        Ok(self.store.get(&key)?.map(|stored| stored.into_entry(&key)))
    }

    /// 新增或整体覆盖一条计划
    pub fn upsert_plan(&self, entry: PlanEntry) -> RepositoryResult<()> {
        let key = entry.key();
        self.store.set(&key, StoredPlan::Entry(entry))
    }

    /// 仅修改数量，保留品名/描述/产线
    pub fn edit_quantity(&self, item: &str, year_month: &str, quantity: f64) -> RepositoryResult<PlanEntry> {
        let mut entry = self
            .get_plan(item, year_month)?
            .unwrap_or_else(|| PlanEntry::new(item, year_month, quantity));
        entry.quantity = quantity;
        self.upsert_plan(entry.clone())?;
        Ok(entry)
    }

    /// 批量导入（合并），返回写入条数
    pub fn import_plans(&self, entries: Vec<PlanEntry>) -> RepositoryResult<usize> {
        let batch: BTreeMap<String, StoredPlan> = entries
            .into_iter()
            .map(|entry| (entry.key(), StoredPlan::Entry(entry)))
            .collect();
        self.store.bulk_set(batch)
    }

    pub fn clear_plans(&self) -> RepositoryResult<()> {
        self.store.clear()
    }
}

// ==========================================
// OverrideRepository - 人工覆写
// ==========================================
pub struct OverrideRepository {
    store: KeyValueStore<f64>,
}

impl OverrideRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            store: KeyValueStore::new(storage, OVERRIDE_DOCUMENT),
        }
    }

    pub fn list_overrides(&self) -> RepositoryResult<BTreeMap<String, f64>> {
        self.store.get_all()
    }

    pub fn get_override(&self, item: &str, year_month: &str) -> RepositoryResult<Option<ManualOverride>> {
        Ok(self
            .store
            .get(&plan_key(item, year_month))?
            .map(|quantity| ManualOverride {
                item: item.to_string(),
                year_month: year_month.to_string(),
                quantity,
            }))
    }

    pub fn set_override(&self, value: &ManualOverride) -> RepositoryResult<()> {
        self.store.set(&value.key(), value.quantity)
    }

    pub fn delete_override(&self, item: &str, year_month: &str) -> RepositoryResult<bool> {
        self.store.delete(&plan_key(item, year_month))
    }
}
