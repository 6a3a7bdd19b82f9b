// ==========================================
// 工厂日报系统 - 日历仓储
// ==========================================
// 文档:
// - work_days.json: yearMonth → 工作天数
// - holidays.json: YYYY-MM-DD → 说明
// - working_days.json: 逐日工作日历 [YYYY-MM-DD, ...]
// ==========================================

use crate::domain::{HolidayEntry, WorkDayCounts};
use crate::repository::document_store::{JsonDocumentStore, KeyValueStore};
use crate::repository::error::RepositoryResult;
use crate::repository::storage::DocumentStorage;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const WORK_DAYS_DOCUMENT: &str = "work_days.json";
pub const HOLIDAYS_DOCUMENT: &str = "holidays.json";
pub const WORKING_DAYS_DOCUMENT: &str = "working_days.json";

// ==========================================
// WorkDayRepository - 月工作天数
// ==========================================
pub struct WorkDayRepository {
    store: KeyValueStore<u32>,
}

impl WorkDayRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            store: KeyValueStore::new(storage, WORK_DAYS_DOCUMENT),
        }
    }

    pub fn get_work_days(&self) -> RepositoryResult<WorkDayCounts> {
        self.store.get_all()
    }

    pub fn get_month(&self, year_month: &str) -> RepositoryResult<Option<u32>> {
        self.store.get(year_month)
    }

    pub fn set_month(&self, year_month: &str, days: u32) -> RepositoryResult<()> {
        self.store.set(year_month, days)
    }

    /// 批量写入，返回写入条数
    pub fn bulk_set(&self, counts: WorkDayCounts) -> RepositoryResult<usize> {
        self.store.bulk_set(counts)
    }

    pub fn delete_month(&self, year_month: &str) -> RepositoryResult<bool> {
        self.store.delete(year_month)
    }
}

// ==========================================
// HolidayRepository - 假日
// ==========================================
pub struct HolidayRepository {
    store: KeyValueStore<String>,
}

impl HolidayRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            store: KeyValueStore::new(storage, HOLIDAYS_DOCUMENT),
        }
    }

    /// 假日列表（按日期升序）
    pub fn list_holidays(&self) -> RepositoryResult<Vec<HolidayEntry>> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .map(|(date, description)| HolidayEntry { date, description })
            .collect())
    }

    /// 日期 → 说明
    pub fn holiday_map(&self) -> RepositoryResult<BTreeMap<String, String>> {
        self.store.get_all()
    }

    pub fn add_holiday(&self, entry: &HolidayEntry) -> RepositoryResult<()> {
        self.store.set(&entry.date, entry.description.clone())
    }

    pub fn delete_holiday(&self, date: &str) -> RepositoryResult<bool> {
        self.store.delete(date)
    }
}

// ==========================================
// WorkingDayRepository - 逐日工作日历
// ==========================================
pub struct WorkingDayRepository {
    doc: JsonDocumentStore<BTreeSet<NaiveDate>>,
}

impl WorkingDayRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            doc: JsonDocumentStore::new(storage, WORKING_DAYS_DOCUMENT),
        }
    }

    pub fn list(&self) -> RepositoryResult<BTreeSet<NaiveDate>> {
        self.doc.load()
    }

    /// 指定月份的工作日
    pub fn dates_in_month(&self, year: i32, month: u32) -> RepositoryResult<Vec<NaiveDate>> {
        Ok(self
            .doc
            .load()?
            .into_iter()
            .filter(|d| d.year() == year && d.month() == month)
            .collect())
    }

    /// 整份替换
    pub fn replace(&self, dates: &BTreeSet<NaiveDate>) -> RepositoryResult<()> {
        self.doc.replace(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::storage::MemoryStorage;

    #[test]
    fn test_holidays_sorted_by_date() {
        let repo = HolidayRepository::new(Arc::new(MemoryStorage::new()));
        repo.add_holiday(&HolidayEntry {
            date: "2025-12-31".to_string(),
            description: "NYE".to_string(),
        })
        .unwrap();
        repo.add_holiday(&HolidayEntry {
            date: "2025-05-01".to_string(),
            description: "Labour".to_string(),
        })
        .unwrap();

        let list = repo.list_holidays().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].date, "2025-05-01");

        assert!(repo.delete_holiday("2025-05-01").unwrap());
        assert_eq!(repo.list_holidays().unwrap().len(), 1);
    }

    #[test]
    fn test_work_days_bulk_merge() {
        let repo = WorkDayRepository::new(Arc::new(MemoryStorage::new()));
        repo.set_month("202504", 22).unwrap();

        let mut batch = WorkDayCounts::new();
        batch.insert("202505".to_string(), 20);
        assert_eq!(repo.bulk_set(batch).unwrap(), 1);

        let all = repo.get_work_days().unwrap();
        assert_eq!(all.get("202504"), Some(&22));
        assert_eq!(all.get("202505"), Some(&20));
    }

    #[test]
    fn test_working_days_in_month() {
        let repo = WorkingDayRepository::new(Arc::new(MemoryStorage::new()));
        let dates: BTreeSet<NaiveDate> = [(2025, 4, 1), (2025, 4, 2), (2025, 5, 1)]
            .iter()
            .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
            .collect();
        repo.replace(&dates).unwrap();

        assert_eq!(repo.dates_in_month(2025, 4).unwrap().len(), 2);
        assert_eq!(repo.dates_in_month(2025, 6).unwrap().len(), 0);
        assert_eq!(repo.list().unwrap().len(), 3);
    }
}
