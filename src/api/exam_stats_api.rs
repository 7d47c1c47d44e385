// ==========================================
// 驾考统计系统 - 统计 API
// ==========================================
// 职责: 为展示层封装 导入 / 筛选项 / 筛选结果 三类操作
// 说明: 不含任何渲染逻辑，返回可直接序列化的结构
// ==========================================

use crate::api::error::ApiResult;
use crate::config::{AppConfig, ImportConfig};
use crate::domain::{
    format_periods, DistinctField, ExamFilters, ExamResultRecord, ExamTypeTotals,
    ImportedPeriod, PassFailTotals, Period,
};
use crate::importer::ExamFileReader;
use crate::repository::ExamStatsStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// 文件导入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// 本次登记的周期（升序）
    pub periods: Vec<Period>,
    /// 去重后写入的行数
    pub inserted: usize,
    /// 来源文件
    pub source_file: String,
}

impl ImportSummary {
    /// 面向用户的导入结果提示
    pub fn message(&self) -> String {
        format!(
            "Imported period(s): {}\nInserted rows: {}",
            format_periods(&self.periods),
            self.inserted
        )
    }
}

/// 筛选项候选值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub months: Vec<i32>,
    pub provinces: Vec<String>,
    pub exam_centers: Vec<String>,
    pub exam_types: Vec<String>,
    pub permits: Vec<String>,
}

/// 筛选结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterView {
    pub rows: Vec<ExamResultRecord>,
    pub totals: PassFailTotals,
    pub by_exam_type: Vec<ExamTypeTotals>,
}

impl FilterView {
    /// 状态栏文本
    pub fn status_line(&self) -> String {
        format!(
            "Rows: {} | Passed: {} | Failed: {} | Pass rate: {:.1}%",
            self.rows.len(),
            self.totals.passed,
            self.totals.failed,
            self.totals.pass_rate()
        )
    }
}

// ==========================================
// ExamStatsApi
// ==========================================
pub struct ExamStatsApi {
    store: Arc<ExamStatsStore>,
    reader: ExamFileReader,
}

impl ExamStatsApi {
    /// 基于已有存储创建 API（不做初始化）
    pub fn new(store: Arc<ExamStatsStore>, import_config: ImportConfig) -> Self {
        Self {
            store,
            reader: ExamFileReader::new(import_config),
        }
    }

    /// 按应用配置打开数据库并初始化 schema
    pub fn open(config: &AppConfig) -> ApiResult<Self> {
        let store = ExamStatsStore::open(&config.db_path)?;
        store.initialize()?;
        info!(db_path = %config.db_path.display(), "统计 API 已就绪");
        Ok(Self::new(Arc::new(store), config.import.clone()))
    }

    pub fn store(&self) -> &ExamStatsStore {
        &self.store
    }

    /// 读取文件并导入
    ///
    /// 来源标签为文件路径；读取失败时不触碰数据库
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<ImportSummary> {
        let path = path.as_ref();
        let import = self.reader.read(path)?;
        let source_file = path.display().to_string();

        let inserted = self
            .store
            .import_records(&import.records, Some(source_file.as_str()))?;

        Ok(ImportSummary {
            periods: import.periods.into_iter().collect(),
            inserted,
            source_file,
        })
    }

    /// 筛选项候选值（months 按 year 限定）
    pub fn filter_options(&self, year: Option<i32>) -> ApiResult<FilterOptions> {
        Ok(FilterOptions {
            years: self.store.distinct_years()?,
            months: self.store.distinct_months(year)?,
            provinces: self.store.distinct_values_of(DistinctField::Province)?,
            exam_centers: self.store.distinct_values_of(DistinctField::ExamCenter)?,
            exam_types: self.store.distinct_values_of(DistinctField::ExamType)?,
            permits: self.store.distinct_values_of(DistinctField::Permit)?,
        })
    }

    /// 应用筛选条件：明细 + 总计 + 按考试类型汇总
    pub fn apply_filters(&self, filters: &ExamFilters) -> ApiResult<FilterView> {
        Ok(FilterView {
            rows: self.store.query(filters)?,
            totals: self.store.aggregate_totals(filters)?,
            by_exam_type: self.store.aggregate_by_exam_type(filters)?,
        })
    }

    /// 字段去重值
    pub fn distinct_values(&self, field: &str) -> ApiResult<Vec<String>> {
        Ok(self.store.distinct_values(field)?)
    }

    /// 已导入周期
    pub fn imported_periods(&self) -> ApiResult<Vec<ImportedPeriod>> {
        Ok(self.store.imported_periods()?)
    }
}
