// ==========================================
// 驾考统计系统 - 考试结果领域模型
// ==========================================
// 职责: 考试结果记录、统计周期、已导入周期、汇总口径
// 对齐: exam_results / imported_periods 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ExamResultRecord - 考试结果记录
// ==========================================
// 唯一键: (province, exam_center, school_code, section_code, month, year, exam_type, permit)
// 生命周期: 导入层创建 → 仓储层写入一次 → 只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResultRecord {
    // ===== 维度字段 =====
    pub province: String,     // DESC_PROVINCIA
    pub exam_center: String,  // CENTRO_EXAMEN
    pub school_code: String,  // CODIGO_AUTOESCUELA
    pub school_name: String,  // NOMBRE_AUTOESCUELA
    pub section_code: String, // CODIGO_SECCION
    pub month: i32,           // MES（1-12，不做范围校验）
    pub year: i32,            // ANYO
    pub exam_type: String,    // TIPO_EXAMEN
    pub permit: String,       // NOMBRE_PERMISO

    // ===== 计数字段 =====
    pub num_passed: i64,            // NUM_APTOS
    pub num_passed_1st: i64,        // NUM_APTOS_1conv
    pub num_passed_2nd: i64,        // NUM_APTOS_2conv
    pub num_passed_3rd_or_4th: i64, // NUM_APTOS_3o4conv
    pub num_passed_5plus: i64,      // NUM_APTOS_5_o_mas_conv
    pub num_failed: i64,            // NUM_NO_APTOS
}

impl ExamResultRecord {
    /// 记录所属统计周期
    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }
}

// ==========================================
// Period - 统计周期（年/月）
// ==========================================
// 排序: 先年后月；显示: YYYY-MM
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: i32,
}

impl Period {
    pub fn new(year: i32, month: i32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// 将周期列表格式化为 "2024-01, 2024-02"（调用方负责排序）
pub fn format_periods<'a, I>(periods: I) -> String
where
    I: IntoIterator<Item = &'a Period>,
{
    periods
        .into_iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ==========================================
// ImportedPeriod - 已导入周期
// ==========================================
// 红线: 每个 (year, month) 最多一条；写入后不更新、不删除
// 说明: row_count 为该周期"提交"的记录数，而非去重后实际写入数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedPeriod {
    pub year: i32,
    pub month: i32,
    pub imported_at: DateTime<Utc>,
    pub source_file: Option<String>,
    pub row_count: i64,
}

impl ImportedPeriod {
    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }
}

// ==========================================
// PassFailTotals - 合格/不合格汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassFailTotals {
    pub passed: i64,
    pub failed: i64,
}

impl PassFailTotals {
    /// 参考人数（合格 + 不合格）
    pub fn attempted(&self) -> i64 {
        self.passed + self.failed
    }

    /// 合格率（百分比），无参考人数时为 0.0
    pub fn pass_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        self.passed as f64 / attempted as f64 * 100.0
    }
}

/// 按考试类型分组的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamTypeTotals {
    pub exam_type: String,
    pub passed: i64,
    pub failed: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_display_is_zero_padded() {
        assert_eq!(Period::new(2024, 3).to_string(), "2024-03");
        assert_eq!(Period::new(2023, 12).to_string(), "2023-12");
    }

    #[test]
    fn test_period_ordering() {
        let mut periods = vec![
            Period::new(2024, 1),
            Period::new(2023, 12),
            Period::new(2024, 2),
        ];
        periods.sort();
        assert_eq!(format_periods(&periods), "2023-12, 2024-01, 2024-02");
    }

    #[test]
    fn test_pass_rate() {
        let totals = PassFailTotals { passed: 3, failed: 1 };
        assert_eq!(totals.attempted(), 4);
        assert!((totals.pass_rate() - 75.0).abs() < f64::EPSILON);

        // 无参考人数
        assert_eq!(PassFailTotals::default().pass_rate(), 0.0);
    }
}
