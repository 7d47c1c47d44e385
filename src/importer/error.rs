// ==========================================
// 驾考统计系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 口径: 任一错误都会中止整个文件读取，不返回部分结果
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("无法解码文件: {path}，最后一次错误: {last_error}")]
    DecodingError { path: String, last_error: String },

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头校验错误 =====
    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== 数据转换错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): 无法解析为整数: {value}")]
    TypeConversionError {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 配置错误 =====
    #[error("不支持的文本编码: {0}")]
    UnsupportedEncoding(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

impl ImportError {
    /// 是否属于数据校验类错误（缺列/数值格式/文件不存在）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::MissingColumns(_)
                | ImportError::TypeConversionError { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
