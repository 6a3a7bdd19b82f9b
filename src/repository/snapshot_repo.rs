// ==========================================
// 工厂日报系统 - 缓存快照仓储
// ==========================================
// 文档: production_data.json
// 与侧存储不同: 快照损坏时返回错误，由对账器决定如何降级
// ==========================================

use crate::domain::{CacheSnapshot, SnapshotDocument};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::DocumentStorage;
use std::sync::Arc;

pub const SNAPSHOT_DOCUMENT: &str = "production_data.json";

pub struct SnapshotRepository {
    storage: Arc<dyn DocumentStorage>,
}

impl SnapshotRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self { storage }
    }

    /// 读取快照；文件不存在返回 Ok(None)
    pub fn load(&self) -> RepositoryResult<Option<CacheSnapshot>> {
        let raw = match self.storage.read(SNAPSHOT_DOCUMENT)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(None),
        };
        let doc: SnapshotDocument = serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::serialization(SNAPSHOT_DOCUMENT, e))?;
        Ok(Some(doc.into_snapshot()))
    }

    /// 整份写入快照
    pub fn save(&self, snapshot: &CacheSnapshot) -> RepositoryResult<()> {
        let raw = serde_json::to_string_pretty(snapshot)
            .map_err(|e| RepositoryError::serialization(SNAPSHOT_DOCUMENT, e))?;
        self.storage.write(SNAPSHOT_DOCUMENT, &raw)
    }

    pub fn location(&self) -> String {
        self.storage.location(SNAPSHOT_DOCUMENT)
    }
}
