// ==========================================
// 驾考统计系统 - API 层错误类型
// ==========================================
// 职责: 将导入层/仓储层/筛选错误转换为面向用户的错误消息
// ==========================================

use crate::domain::{format_periods, FilterError, Period};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 导入错误
    // ==========================================
    /// 文件不存在 / 缺列 / 数值格式错误
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("文件解码失败: {0}")]
    DecodingError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("以下周期已导入: {}", format_periods(.periods))]
    ImportConflict { periods: Vec<Period> },

    #[error("没有可导入的记录")]
    EmptyBatch,

    // ==========================================
    // 查询输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigurationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库未初始化")]
    NotInitialized,

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::DecodingError { .. } => ApiError::DecodingError(err.to_string()),
            ImportError::UnsupportedEncoding(_) | ImportError::ConfigValueError { .. } => {
                ApiError::ConfigurationError(err.to_string())
            }
            _ if err.is_validation() => ApiError::ValidationError(err.to_string()),
            _ => ApiError::ImportError(err.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::EmptyBatch => ApiError::EmptyBatch,
            RepositoryError::PeriodsAlreadyImported { periods } => {
                ApiError::ImportConflict { periods }
            }
            RepositoryError::UnsupportedDistinctField(field) => {
                ApiError::ConfigurationError(format!("不支持的去重字段: {}", field))
            }
            RepositoryError::SchemaNotInitialized => ApiError::NotInitialized,
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 FilterError 转换
// ==========================================
impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidInteger { .. } => ApiError::InvalidInput(err.to_string()),
            FilterError::UnknownDistinctField(_) => ApiError::ConfigurationError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
