// ==========================================
// 工厂日报系统 - 文档存储后端
// ==========================================
// DocumentStorage: 按文档名读写整份文本
// - FileStorage: 数据目录下的 JSON 文件，写入为 "临时文件 + rename"
// - MemoryStorage: 测试用内存实现
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ==========================================
// Trait: DocumentStorage
// ==========================================
pub trait DocumentStorage: Send + Sync {
    /// 读取整份文档；文档不存在返回 Ok(None)
    fn read(&self, name: &str) -> RepositoryResult<Option<String>>;

    /// 整份覆盖写入
    fn write(&self, name: &str, contents: &str) -> RepositoryResult<()>;

    /// 日志用的文档位置描述
    fn location(&self, name: &str) -> String {
        name.to_string()
    }
}

// ==========================================
// FileStorage - 文件后端
// ==========================================
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// 创建文件后端（目录不存在时自动创建）
    pub fn new(root: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| RepositoryError::io(&root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl DocumentStorage for FileStorage {
    fn read(&self, name: &str) -> RepositoryResult<Option<String>> {
        match fs::read_to_string(self.path_of(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::io(name, e)),
        }
    }

    fn write(&self, name: &str, contents: &str) -> RepositoryResult<()> {
        let target = self.path_of(name);
        let mut tmp_path = target.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let mut file: File = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| RepositoryError::io(name, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| RepositoryError::io(name, e))?;
        file.sync_all().map_err(|e| RepositoryError::io(name, e))?;
        drop(file);

        fs::rename(&tmp_path, &target).map_err(|e| RepositoryError::io(name, e))?;
        Ok(())
    }

    fn location(&self, name: &str) -> String {
        self.path_of(name).display().to_string()
    }
}

// ==========================================
// MemoryStorage - 内存后端
// ==========================================
#[derive(Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置文档内容
    pub fn with_document(self, name: &str, contents: &str) -> Self {
        if let Ok(mut docs) = self.documents.lock() {
            docs.insert(name.to_string(), contents.to_string());
        }
        self
    }
}

impl DocumentStorage for MemoryStorage {
    fn read(&self, name: &str) -> RepositoryResult<Option<String>> {
        let docs = self
            .documents
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(docs.get(name).cloned())
    }

    fn write(&self, name: &str, contents: &str) -> RepositoryResult<()> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        docs.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn location(&self, name: &str) -> String {
        format!("memory://{}", name)
    }
}
