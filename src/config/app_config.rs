// ==========================================
// 驾考统计系统 - 应用配置
// ==========================================
// 职责: 数据库路径、导入分隔符、候选编码的解析
// 来源: 环境变量 > 默认值
// ==========================================

use crate::importer::encoding::{TextEncoding, DEFAULT_ENCODINGS};
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 配置键（环境变量名）
pub mod config_keys {
    pub const DB_PATH: &str = "DRIVING_EXAMS_DB_PATH";
    pub const DELIMITER: &str = "DRIVING_EXAMS_DELIMITER";
    pub const ENCODINGS: &str = "DRIVING_EXAMS_ENCODINGS";
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 字段分隔符（单字节）
    pub delimiter: u8,
    /// 候选编码（按优先级）
    pub encodings: Vec<TextEncoding>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub import: ImportConfig,
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn from_env() -> ImportResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置（便于测试）
    pub fn from_lookup<F>(lookup: F) -> ImportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = read(config_keys::DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let mut import = ImportConfig::default();

        if let Some(raw) = read(config_keys::DELIMITER) {
            import.delimiter = parse_delimiter(&raw)?;
        }

        if let Some(raw) = read(config_keys::ENCODINGS) {
            import.encodings = raw
                .split(',')
                .map(|name| name.parse::<TextEncoding>())
                .collect::<ImportResult<Vec<_>>>()?;
        }

        Ok(Self { db_path, import })
    }
}

fn parse_delimiter(raw: &str) -> ImportResult<u8> {
    let bytes = raw.as_bytes();
    if bytes.len() != 1 {
        return Err(ImportError::ConfigValueError {
            key: config_keys::DELIMITER.to_string(),
            value: raw.to_string(),
            message: "分隔符必须是单个 ASCII 字符".to_string(),
        });
    }
    Ok(bytes[0])
}

/// 默认数据库路径
///
/// 优先使用用户数据目录；开发构建使用独立目录，避免污染正式数据
pub fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => {
            #[cfg(debug_assertions)]
            let dir = data_dir.join("driving-exams-dev");

            #[cfg(not(debug_assertions))]
            let dir = data_dir.join("driving-exams");

            dir.join("driving_exams.db")
        }
        None => PathBuf::from("./driving_exams.db"),
    }
}
