// ==========================================
// 工厂日报系统 - 注释仓储
// ==========================================
// 文档: comments.json
// 键: "<item>_<yearMonth>" → 自由文本（纯标注，不参与计算）
// ==========================================

use crate::domain::plan_key;
use crate::repository::document_store::KeyValueStore;
use crate::repository::error::RepositoryResult;
use crate::repository::storage::DocumentStorage;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const COMMENTS_DOCUMENT: &str = "comments.json";

pub struct CommentRepository {
    store: KeyValueStore<String>,
}

impl CommentRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            store: KeyValueStore::new(storage, COMMENTS_DOCUMENT),
        }
    }

    /// 全部注释
    pub fn get_comments(&self) -> RepositoryResult<BTreeMap<String, String>> {
        self.store.get_all()
    }

    pub fn get_comment(&self, item: &str, year_month: &str) -> RepositoryResult<Option<String>> {
        self.store.get(&plan_key(item, year_month))
    }

    /// 保存注释（后写覆盖）
    pub fn save_comment(&self, item: &str, year_month: &str, comment: &str) -> RepositoryResult<()> {
        self.store.set(&plan_key(item, year_month), comment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::storage::MemoryStorage;

    #[test]
    fn test_save_and_get_comment() {
        let repo = CommentRepository::new(Arc::new(MemoryStorage::new()));
        repo.save_comment("ITEM1", "202511", "note").unwrap();

        let all = repo.get_comments().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("ITEM1_202511").map(String::as_str), Some("note"));
        assert_eq!(repo.get_comment("ITEM1", "202511").unwrap().as_deref(), Some("note"));
        assert_eq!(repo.get_comment("ITEM1", "202512").unwrap(), None);
    }
}
