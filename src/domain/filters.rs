// ==========================================
// 驾考统计系统 - 查询筛选条件
// ==========================================
// 职责: 定义查询/汇总共用的筛选条件，以及可枚举去重的字段白名单
// 口径: 未设置/空字符串/0 均视为"不限"
// ==========================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// 筛选条件解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("筛选值格式错误 (key: {key}): 无法解析为整数: {value}")]
    InvalidInteger { key: String, value: String },

    #[error("不支持的去重字段: {0}")]
    UnknownDistinctField(String),
}

// ==========================================
// ExamFilters - 筛选条件
// ==========================================
// 仅支持等值与包含匹配，不支持范围/OR/取反
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamFilters {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub province: Option<String>,
    pub exam_center: Option<String>,
    pub school_code: Option<String>,
    pub exam_type: Option<String>,
    pub permit: Option<String>,
    /// 驾校名称包含（LIKE 匹配，大小写规则由 SQLite 决定）
    pub school_name_contains: Option<String>,
}

impl ExamFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: i32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn with_exam_center(mut self, exam_center: impl Into<String>) -> Self {
        self.exam_center = Some(exam_center.into());
        self
    }

    pub fn with_school_code(mut self, school_code: impl Into<String>) -> Self {
        self.school_code = Some(school_code.into());
        self
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    pub fn with_permit(mut self, permit: impl Into<String>) -> Self {
        self.permit = Some(permit.into());
        self
    }

    pub fn with_school_name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.school_name_contains = Some(fragment.into());
        self
    }

    /// 从键值对构建筛选条件
    ///
    /// # 说明
    /// - 未识别的键直接忽略
    /// - 空值视为不限
    /// - year/month 非整数时返回错误
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "year" => filters.year = Some(parse_int(key, value)?),
                "month" => filters.month = Some(parse_int(key, value)?),
                "province" => filters.province = Some(value.to_string()),
                "exam_center" => filters.exam_center = Some(value.to_string()),
                "school_code" => filters.school_code = Some(value.to_string()),
                "exam_type" => filters.exam_type = Some(value.to_string()),
                "permit" => filters.permit = Some(value.to_string()),
                "school_name_contains" => filters.school_name_contains = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(filters)
    }

    /// 生效的年份条件（0 视为不限）
    pub fn year_constraint(&self) -> Option<i32> {
        self.year.filter(|y| *y != 0)
    }

    /// 生效的月份条件（0 视为不限）
    pub fn month_constraint(&self) -> Option<i32> {
        self.month.filter(|m| *m != 0)
    }

    /// 生效的等值文本条件: (列名, 值)
    pub fn text_constraints(&self) -> Vec<(&'static str, &str)> {
        [
            ("province", &self.province),
            ("exam_center", &self.exam_center),
            ("school_code", &self.school_code),
            ("exam_type", &self.exam_type),
            ("permit", &self.permit),
        ]
        .into_iter()
        .filter_map(|(column, value)| non_empty(value).map(|v| (column, v)))
        .collect()
    }

    /// 生效的驾校名称包含条件
    pub fn school_name_constraint(&self) -> Option<&str> {
        non_empty(&self.school_name_contains)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_int(key: &str, value: &str) -> Result<i32, FilterError> {
    value.parse::<i32>().map_err(|_| FilterError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// ==========================================
// DistinctField - 可去重枚举的字段白名单
// ==========================================
// 红线: 列名只能来自白名单，禁止由自由输入拼接 SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctField {
    Province,
    ExamCenter,
    SchoolCode,
    SchoolName,
    SectionCode,
    ExamType,
    Permit,
}

impl DistinctField {
    pub const ALL: [DistinctField; 7] = [
        DistinctField::Province,
        DistinctField::ExamCenter,
        DistinctField::SchoolCode,
        DistinctField::SchoolName,
        DistinctField::SectionCode,
        DistinctField::ExamType,
        DistinctField::Permit,
    ];

    /// 对应的 exam_results 列名
    pub fn column(&self) -> &'static str {
        match self {
            DistinctField::Province => "province",
            DistinctField::ExamCenter => "exam_center",
            DistinctField::SchoolCode => "school_code",
            DistinctField::SchoolName => "school_name",
            DistinctField::SectionCode => "section_code",
            DistinctField::ExamType => "exam_type",
            DistinctField::Permit => "permit",
        }
    }
}

impl FromStr for DistinctField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistinctField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| FilterError::UnknownDistinctField(s.to_string()))
    }
}
