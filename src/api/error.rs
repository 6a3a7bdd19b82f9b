// ==========================================
// 工厂日报系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户可读的消息
// 分类: 调用方输入问题（InvalidInput / ValidationError / Forbidden / NotFound）
//       与内部故障（InternalError / Other）
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("禁止操作: {0}")]
    Forbidden(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 内部错误
    // ==========================================
    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否由调用方输入引起
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_)
                | ApiError::ValidationError(_)
                | ApiError::Forbidden(_)
                | ApiError::NotFound(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Io { .. } | RepositoryError::Serialization { .. } => {
                ApiError::StorageError(err.to_string())
            }
            RepositoryError::LockError(msg) => {
                ApiError::StorageError(format!("锁获取失败: {}", msg))
            }
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(_)
            | ImportError::UnsupportedFormat(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)
            | ImportError::EmptyInput(_) => ApiError::InvalidInput(err.to_string()),
            ImportError::FieldMappingError { .. }
            | ImportError::TypeConversionError { .. }
            | ImportError::NegativeQuantity { .. } => ApiError::ValidationError(err.to_string()),
            ImportError::FileReadError(msg) => ApiError::InternalError(msg),
            ImportError::Other(e) => ApiError::Other(e),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
