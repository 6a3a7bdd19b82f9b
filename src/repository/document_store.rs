// ==========================================
// 工厂日报系统 - JSON 文档仓储基础
// ==========================================
// 模型: 整读 → 修改 → 整写（同一文档的写入在进程内串行）
// 缺失文档视为空文档；损坏文档记录告警后视为空文档
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::DocumentStorage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

// ==========================================
// JsonDocumentStore - 单个 JSON 文档
// ==========================================
pub struct JsonDocumentStore<T> {
    storage: Arc<dyn DocumentStorage>,
    name: String,
    write_lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(storage: Arc<dyn DocumentStorage>, name: &str) -> Self {
        Self {
            storage,
            name: name.to_string(),
            write_lock: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 读取文档
    pub fn load(&self) -> RepositoryResult<T> {
        let raw = match self.storage.read(&self.name)? {
            Some(raw) => raw,
            None => return Ok(T::default()),
        };
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(
                    "文档解析失败，按空文档处理: {} ({})",
                    self.storage.location(&self.name),
                    e
                );
                Ok(T::default())
            }
        }
    }

    /// 整份覆盖
    pub fn replace(&self, doc: &T) -> RepositoryResult<()> {
        let _guard = self.lock()?;
        self.save(doc)
    }

    /// 读-改-写
    pub fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> RepositoryResult<R> {
        let _guard = self.lock()?;
        let mut doc = self.load()?;
        let result = mutate(&mut doc);
        self.save(&doc)?;
        Ok(result)
    }

    fn save(&self, doc: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string_pretty(doc)
            .map_err(|e| RepositoryError::serialization(&self.name, e))?;
        self.storage.write(&self.name, &raw)
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

// ==========================================
// KeyValueStore - 扁平键值文档
// ==========================================
pub struct KeyValueStore<V> {
    doc: JsonDocumentStore<BTreeMap<String, V>>,
}

impl<V> KeyValueStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    pub fn new(storage: Arc<dyn DocumentStorage>, name: &str) -> Self {
        Self {
            doc: JsonDocumentStore::new(storage, name),
        }
    }

    pub fn get_all(&self) -> RepositoryResult<BTreeMap<String, V>> {
        self.doc.load()
    }

    pub fn get(&self, key: &str) -> RepositoryResult<Option<V>> {
        Ok(self.doc.load()?.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: V) -> RepositoryResult<()> {
        self.doc.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    /// 批量写入（合并到现有文档），返回写入条数
    pub fn bulk_set(&self, entries: BTreeMap<String, V>) -> RepositoryResult<usize> {
        self.doc.update(|map| {
            let count = entries.len();
            map.extend(entries);
            count
        })
    }

    /// 整份替换
    pub fn replace_all(&self, entries: &BTreeMap<String, V>) -> RepositoryResult<()> {
        self.doc.replace(entries)
    }

    /// 删除键，返回是否存在
    pub fn delete(&self, key: &str) -> RepositoryResult<bool> {
        self.doc.update(|map| map.remove(key).is_some())
    }

    pub fn clear(&self) -> RepositoryResult<()> {
        self.doc.replace(&BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::storage::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, KeyValueStore<String>) {
        let storage = Arc::new(MemoryStorage::new());
        let kv = KeyValueStore::new(storage.clone(), "comments.json");
        (storage, kv)
    }

    #[test]
    fn test_missing_document_is_empty() {
        let (_storage, kv) = store();
        assert!(kv.get_all().unwrap().is_empty());
        assert_eq!(kv.get("x").unwrap(), None);
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let (_storage, kv) = store();
        kv.set("ITEM1_202511", "note".to_string()).unwrap();
        kv.set("ITEM2_202511", "other".to_string()).unwrap();

        let all = kv.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("ITEM1_202511").map(String::as_str), Some("note"));
    }

    #[test]
    fn test_corrupt_document_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::new().with_document("bad.json", "{not json"));
        let kv: KeyValueStore<u32> = KeyValueStore::new(storage, "bad.json");
        assert!(kv.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_bulk_set_and_delete() {
        let storage = Arc::new(MemoryStorage::new());
        let kv: KeyValueStore<u32> = KeyValueStore::new(storage, "work_days.json");
        kv.set("202504", 22).unwrap();

        let mut batch = BTreeMap::new();
        batch.insert("202505".to_string(), 21);
        batch.insert("202504".to_string(), 20);
        assert_eq!(kv.bulk_set(batch).unwrap(), 2);
        assert_eq!(kv.get("202504").unwrap(), Some(20));

        assert!(kv.delete("202505").unwrap());
        assert!(!kv.delete("202505").unwrap());
        assert_eq!(kv.get_all().unwrap().len(), 1);

        kv.clear().unwrap();
        assert!(kv.get_all().unwrap().is_empty());
    }
}
