// ==========================================
// 驾考统计系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,列名只来自白名单
// ==========================================

pub mod error;
pub mod exam_stats_store;
pub mod filter_sql;
pub mod schema;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use exam_stats_store::ExamStatsStore;
pub use filter_sql::FilteredQuery;
pub use schema::initialize_schema;
