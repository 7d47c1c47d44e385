// ==========================================
// 驾考统计系统 - 报表数据
// ==========================================
// 职责: 报表标题/筛选描述/总计行/表格单元格的文本化
// 说明: 只准备数据，分页与排版由展示层负责
// ==========================================

use crate::domain::{ExamFilters, ExamResultRecord, PassFailTotals};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const REPORT_TITLE: &str = "Driving Exams Report";

/// 表格列标题（显示顺序）
pub const TABLE_HEADERS: [&str; 15] = [
    "Year",
    "Month",
    "Province",
    "Exam center",
    "School code",
    "School name",
    "Section",
    "Exam type",
    "Permit",
    "Passed",
    "Failed",
    "Passed 1st",
    "Passed 2nd",
    "Passed 3rd/4th",
    "Passed 5+",
];

// ==========================================
// ReportSummary - 报表头部
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub title: String,
    pub generated_at: String,
    pub filter_lines: Vec<String>,
    pub totals_line: String,
}

impl ReportSummary {
    pub fn build(filters: &ExamFilters, totals: &PassFailTotals) -> Self {
        Self::build_at(filters, totals, Local::now())
    }

    /// 指定生成时间（便于测试）
    pub fn build_at(
        filters: &ExamFilters,
        totals: &PassFailTotals,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            generated_at: format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
            filter_lines: filter_lines(filters),
            totals_line: format!(
                "Totals: Passed={} | Failed={} | Pass rate={:.1}%",
                totals.passed,
                totals.failed,
                totals.pass_rate()
            ),
        }
    }

    /// 按绘制顺序输出所有文本行
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone(), self.generated_at.clone()];
        lines.extend(self.filter_lines.iter().cloned());
        lines.push(self.totals_line.clone());
        lines
    }
}

/// 筛选条件描述行
fn filter_lines(filters: &ExamFilters) -> Vec<String> {
    let year = filters.year_constraint().map(|y| y.to_string());
    let month = filters.month_constraint().map(|m| m.to_string());

    let labelled: [(&str, Option<&str>); 8] = [
        ("Year", year.as_deref()),
        ("Month", month.as_deref()),
        ("Province", filters.province.as_deref()),
        ("Exam center", filters.exam_center.as_deref()),
        ("Exam type", filters.exam_type.as_deref()),
        ("Permit", filters.permit.as_deref()),
        ("School code", filters.school_code.as_deref()),
        ("School name contains", filters.school_name_constraint()),
    ];

    let parts: Vec<String> = labelled
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}: {}", label, v))
        })
        .collect();

    if parts.is_empty() {
        vec!["Filters: (none)".to_string()]
    } else {
        vec![format!("Filters: {}", parts.join(" | "))]
    }
}

// ==========================================
// ResultTable - 表格文本
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn from_records(records: &[ExamResultRecord]) -> Self {
        Self {
            headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: records.iter().map(record_cells).collect(),
        }
    }
}

fn record_cells(r: &ExamResultRecord) -> Vec<String> {
    vec![
        r.year.to_string(),
        r.month.to_string(),
        r.province.clone(),
        r.exam_center.clone(),
        r.school_code.clone(),
        r.school_name.clone(),
        r.section_code.clone(),
        r.exam_type.clone(),
        r.permit.clone(),
        r.num_passed.to_string(),
        r.num_failed.to_string(),
        r.num_passed_1st.to_string(),
        r.num_passed_2nd.to_string(),
        r.num_passed_3rd_or_4th.to_string(),
        r.num_passed_5plus.to_string(),
    ]
}

/// 默认报表文件名（年、月都选定时带周期后缀）
pub fn default_report_file_name(filters: &ExamFilters) -> String {
    match (filters.year_constraint(), filters.month_constraint()) {
        (Some(year), Some(month)) => format!("driving_exams_report_{}_{:02}.pdf", year, month),
        _ => "driving_exams_report.pdf".to_string(),
    }
}
