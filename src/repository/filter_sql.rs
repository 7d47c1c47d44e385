// ==========================================
// 驾考统计系统 - 筛选 SQL 构建
// ==========================================
// 职责: ExamFilters → WHERE 子句 + 绑定参数
// 约束: 条件值一律参数化；列名只来自代码常量
// ==========================================

use crate::domain::ExamFilters;
use rusqlite::types::Value;

/// 带参数的 SQL 查询构建器（流式 API）
///
/// # 示例
/// ```
/// use driving_exams_stats::domain::ExamFilters;
/// use driving_exams_stats::repository::filter_sql::FilteredQuery;
///
/// let filters = ExamFilters::new().with_year(2024).with_province("Madrid");
/// let query = FilteredQuery::new("SELECT * FROM exam_results")
///     .filters(&filters)
///     .order_by("year DESC");
///
/// assert_eq!(
///     query.build(),
///     "SELECT * FROM exam_results WHERE year = ? AND province = ? ORDER BY year DESC"
/// );
/// assert_eq!(query.params().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FilteredQuery {
    select_clause: String,
    where_clauses: Vec<String>,
    params: Vec<Value>,
    group_by_clause: Option<String>,
    order_by_clause: Option<String>,
}

impl FilteredQuery {
    /// 创建新的查询构建器
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_clause: None,
            order_by_clause: None,
        }
    }

    /// 添加等值条件
    pub fn where_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.into());
        self
    }

    /// 添加包含条件（LIKE，转义通配符）
    pub fn where_contains(mut self, column: &'static str, fragment: &str) -> Self {
        self.where_clauses
            .push(format!("{} LIKE ? ESCAPE '\\'", column));
        self.params
            .push(Value::Text(format!("%{}%", escape_like(fragment))));
        self
    }

    /// 应用筛选条件（仅生效的条件会生成子句）
    pub fn filters(mut self, filters: &ExamFilters) -> Self {
        if let Some(year) = filters.year_constraint() {
            self = self.where_eq("year", year);
        }
        if let Some(month) = filters.month_constraint() {
            self = self.where_eq("month", month);
        }
        for (column, value) in filters.text_constraints() {
            self = self.where_eq(column, value.to_string());
        }
        if let Some(fragment) = filters.school_name_constraint() {
            self = self.where_contains("school_name", fragment);
        }
        self
    }

    /// 添加 GROUP BY 子句
    pub fn group_by(mut self, group: &str) -> Self {
        self.group_by_clause = Some(group.to_string());
        self
    }

    /// 添加 ORDER BY 子句
    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by_clause = Some(order.to_string());
        self
    }

    /// 构建最终的 SQL 语句
    pub fn build(&self) -> String {
        let mut sql = self.select_clause.clone();

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(group) = &self.group_by_clause {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if let Some(order) = &self.order_by_clause {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        sql
    }

    /// 绑定参数（与 build() 中的 ? 一一对应）
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// 转义 LIKE 通配符（\ % _）
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
