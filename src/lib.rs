// ==========================================
// 驾考统计系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 驾考结果月度数据的导入、筛选与汇总
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录/周期/筛选条件
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    DistinctField, ExamFilters, ExamResultRecord, ExamTypeTotals, ImportedPeriod,
    PassFailTotals, Period,
};

// 导入
pub use importer::{read_exam_file, ExamFileImport, ExamFileReader, ImportError};

// 仓储
pub use repository::{ExamStatsStore, RepositoryError};

// API
pub use api::{ApiError, ExamStatsApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "驾考统计系统";
