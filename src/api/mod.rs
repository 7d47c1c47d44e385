// ==========================================
// 驾考统计系统 - API 层
// ==========================================
// 职责: 为展示层（命令行/桌面界面）提供导入、筛选与报表数据接口
// ==========================================

pub mod error;
pub mod exam_stats_api;
pub mod report;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use exam_stats_api::{ExamStatsApi, FilterOptions, FilterView, ImportSummary};
pub use report::{default_report_file_name, ReportSummary, ResultTable};
