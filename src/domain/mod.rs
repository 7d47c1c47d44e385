// ==========================================
// 驾考统计系统 - 领域模型层
// ==========================================
// 职责: 考试结果、统计周期、筛选条件等值对象
// ==========================================

pub mod exam;
pub mod filters;

pub use exam::{
    format_periods, ExamResultRecord, ExamTypeTotals, ImportedPeriod, PassFailTotals, Period,
};
pub use filters::{DistinctField, ExamFilters, FilterError};
