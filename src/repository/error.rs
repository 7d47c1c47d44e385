// ==========================================
// 驾考统计系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 口径: 业务前置条件失败时不产生任何写入
// ==========================================

use crate::domain::{format_periods, Period};
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 导入前置条件 =====
    #[error("没有可导入的记录")]
    EmptyBatch,

    #[error("以下周期已导入: {}", format_periods(.periods))]
    PeriodsAlreadyImported { periods: Vec<Period> },

    // ===== 查询配置错误 =====
    #[error("不支持的去重字段: {0}")]
    UnsupportedDistinctField(String),

    // ===== 生命周期错误 =====
    #[error("数据库 schema 未初始化，请先调用 initialize()")]
    SchemaNotInitialized,

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_periods() {
        let err = RepositoryError::PeriodsAlreadyImported {
            periods: vec![Period::new(2024, 1), Period::new(2024, 2)],
        };
        assert_eq!(err.to_string(), "以下周期已导入: 2024-01, 2024-02");
    }

    #[test]
    fn test_from_sqlite_failure() {
        let err: RepositoryError = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed: imported_periods.year".to_string()),
        )
        .into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }
}
