// ==========================================
// 工厂日报系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 存储错误 =====
    #[error("文档读写失败 ({document}): {message}")]
    Io { document: String, message: String },

    #[error("文档序列化失败 ({document}): {message}")]
    Serialization { document: String, message: String },

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn io(document: &str, err: std::io::Error) -> Self {
        RepositoryError::Io {
            document: document.to_string(),
            message: err.to_string(),
        }
    }

    pub fn serialization(document: &str, err: serde_json::Error) -> Self {
        RepositoryError::Serialization {
            document: document.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
