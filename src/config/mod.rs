// ==========================================
// 驾考统计系统 - 配置层
// ==========================================
// 职责: 应用配置加载（环境变量 + 默认值）
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{config_keys, default_db_path, AppConfig, ImportConfig};
