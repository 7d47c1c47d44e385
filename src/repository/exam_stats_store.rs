// ==========================================
// 驾考统计系统 - 考试统计存储
// ==========================================
// 职责: 持久化考试结果、按周期幂等导入、筛选查询与汇总
// 状态: Uninitialized --initialize()--> Ready
// 红线: 导入为单一事务（周期检查 + 行写入 + 周期登记），全成功或全回滚
// 说明: row_count 记录"提交"条数（含批内重复），不是去重后写入条数
// ==========================================

use crate::db;
use crate::domain::{
    DistinctField, ExamFilters, ExamResultRecord, ExamTypeTotals, ImportedPeriod,
    PassFailTotals, Period,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::filter_sql::FilteredQuery;
use crate::repository::schema::initialize_schema;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// 记录查询列（顺序与 map_record 一致）
const RECORD_COLUMNS: &str = "province, exam_center, school_code, school_name, section_code, \
     month, year, exam_type, permit, num_passed, num_passed_1st, num_passed_2nd, \
     num_passed_3rd_or_4th, num_passed_5plus, num_failed";

/// 查询结果固定排序（id 兜底，排序键全部相同时按写入顺序）
const QUERY_ORDER: &str = "year DESC, month DESC, province ASC, exam_center ASC, \
     school_name ASC, exam_type ASC, permit ASC, id ASC";

const INSERT_RECORD_SQL: &str = r#"
    INSERT OR IGNORE INTO exam_results (
        province, exam_center, school_code, school_name, section_code,
        month, year, exam_type, permit,
        num_passed, num_passed_1st, num_passed_2nd, num_passed_3rd_or_4th,
        num_passed_5plus, num_failed
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
"#;

const INSERT_PERIOD_SQL: &str = r#"
    INSERT INTO imported_periods (year, month, imported_at, source_file, row_count)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

/// imported_at 的存储格式（UTC，RFC 3339）
const IMPORTED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ==========================================
// ExamStatsStore - 考试统计存储
// ==========================================
pub struct ExamStatsStore {
    conn: Arc<Mutex<Connection>>,
    ready: AtomicBool,
}

impl ExamStatsStore {
    /// 打开数据库文件（父目录不存在时自动创建）
    ///
    /// # 返回
    /// - Ok(ExamStatsStore): 处于 Uninitialized 状态的存储
    /// - Err(DatabaseConnectionError): 目录创建或连接失败
    pub fn open<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RepositoryError::DatabaseConnectionError(format!(
                    "无法创建数据库目录 {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        debug!(path = %db_path.display(), "数据库连接已打开");
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 打开内存数据库
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = db::open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建存储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            ready: AtomicBool::new(false),
        }
    }

    /// 共享底层连接
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 校验 schema 已就绪（首次检查通过后缓存）
    fn ensure_ready(&self, conn: &Connection) -> RepositoryResult<()> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        if db::schema_ready(conn)? {
            self.ready.store(true, Ordering::Release);
            Ok(())
        } else {
            Err(RepositoryError::SchemaNotInitialized)
        }
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 创建表与索引（幂等）
    pub fn initialize(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        initialize_schema(&conn)?;
        self.ready.store(true, Ordering::Release);
        info!("考试统计 schema 已就绪");
        Ok(())
    }

    /// schema 是否已就绪
    pub fn is_ready(&self) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        match self.ensure_ready(&conn) {
            Ok(()) => Ok(true),
            Err(RepositoryError::SchemaNotInitialized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 释放连接
    ///
    /// 连接仍被其他实例共享时只释放本实例的引用
    pub fn close(self) -> RepositoryResult<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|e| RepositoryError::LockError(e.to_string()))?;
                conn.close()
                    .map_err(|(_, e)| RepositoryError::DatabaseConnectionError(e.to_string()))
            }
            Err(_) => Ok(()),
        }
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入一批记录
    ///
    /// # 参数
    /// - records: 标准化记录
    /// - source_file: 来源标签（仅记录，不参与校验）
    ///
    /// # 返回
    /// - Ok(usize): 去重后实际写入的行数
    /// - Err(EmptyBatch): 记录为空
    /// - Err(PeriodsAlreadyImported): 任一周期已导入（列出全部冲突周期，无副作用）
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn import_records(
        &self,
        records: &[ExamResultRecord],
        source_file: Option<&str>,
    ) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Err(RepositoryError::EmptyBatch);
        }

        let mut submitted: BTreeMap<Period, i64> = BTreeMap::new();
        for record in records {
            *submitted.entry(record.period()).or_insert(0) += 1;
        }

        let mut conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        // IMMEDIATE: 周期检查在写锁内执行，并发导入不会同时通过
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut conflicts = Vec::new();
        {
            let mut stmt =
                tx.prepare("SELECT 1 FROM imported_periods WHERE year = ?1 AND month = ?2")?;
            for period in submitted.keys() {
                if stmt.exists(params![period.year, period.month])? {
                    conflicts.push(*period);
                }
            }
        }
        if !conflicts.is_empty() {
            warn!(conflicts = conflicts.len(), "周期已导入，拒绝本次导入");
            return Err(RepositoryError::PeriodsAlreadyImported { periods: conflicts });
        }

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(INSERT_RECORD_SQL)?;
            for r in records {
                inserted += stmt.execute(params![
                    r.province,
                    r.exam_center,
                    r.school_code,
                    r.school_name,
                    r.section_code,
                    r.month,
                    r.year,
                    r.exam_type,
                    r.permit,
                    r.num_passed,
                    r.num_passed_1st,
                    r.num_passed_2nd,
                    r.num_passed_3rd_or_4th,
                    r.num_passed_5plus,
                    r.num_failed,
                ])?;
            }
        }

        let imported_at = Utc::now().format(IMPORTED_AT_FORMAT).to_string();
        {
            let mut stmt = tx.prepare(INSERT_PERIOD_SQL)?;
            for (period, row_count) in &submitted {
                stmt.execute(params![
                    period.year,
                    period.month,
                    imported_at,
                    source_file,
                    row_count
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            inserted,
            skipped = records.len() - inserted,
            periods = submitted.len(),
            "考试结果导入完成"
        );
        Ok(inserted)
    }

    /// 周期是否已导入
    pub fn is_period_imported(&self, year: i32, month: i32) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let mut stmt =
            conn.prepare("SELECT 1 FROM imported_periods WHERE year = ?1 AND month = ?2")?;
        Ok(stmt.exists(params![year, month])?)
    }

    /// 已导入周期列表（年、月降序）
    pub fn imported_periods(&self) -> RepositoryResult<Vec<ImportedPeriod>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT year, month, imported_at, source_file, row_count
            FROM imported_periods
            ORDER BY year DESC, month DESC
            "#,
        )?;

        let periods = stmt
            .query_map([], map_imported_period)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(periods)
    }

    // ==========================================
    // 查询与汇总
    // ==========================================

    /// 按筛选条件查询记录（固定排序）
    pub fn query(&self, filters: &ExamFilters) -> RepositoryResult<Vec<ExamResultRecord>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let query = FilteredQuery::new(&format!("SELECT {} FROM exam_results", RECORD_COLUMNS))
            .filters(filters)
            .order_by(QUERY_ORDER);

        let mut stmt = conn.prepare(&query.build())?;
        let records = stmt
            .query_map(params_from_iter(query.params()), map_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(rows = records.len(), "查询完成");
        Ok(records)
    }

    /// 合格/不合格总数（无匹配时为 0/0）
    pub fn aggregate_totals(&self, filters: &ExamFilters) -> RepositoryResult<PassFailTotals> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let query = FilteredQuery::new(
            "SELECT COALESCE(SUM(num_passed), 0), COALESCE(SUM(num_failed), 0) FROM exam_results",
        )
        .filters(filters);

        let totals = conn.query_row(&query.build(), params_from_iter(query.params()), |row| {
            Ok(PassFailTotals {
                passed: row.get(0)?,
                failed: row.get(1)?,
            })
        })?;
        Ok(totals)
    }

    /// 按考试类型分组汇总（exam_type 升序）
    pub fn aggregate_by_exam_type(
        &self,
        filters: &ExamFilters,
    ) -> RepositoryResult<Vec<ExamTypeTotals>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let query = FilteredQuery::new(
            "SELECT exam_type, COALESCE(SUM(num_passed), 0), COALESCE(SUM(num_failed), 0) \
             FROM exam_results",
        )
        .filters(filters)
        .group_by("exam_type")
        .order_by("exam_type ASC");

        let mut stmt = conn.prepare(&query.build())?;
        let totals = stmt
            .query_map(params_from_iter(query.params()), |row| {
                Ok(ExamTypeTotals {
                    exam_type: row.get(0)?,
                    passed: row.get(1)?,
                    failed: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    // ==========================================
    // 去重枚举
    // ==========================================

    /// 字段去重值（字段名须在白名单内）
    pub fn distinct_values(&self, field: &str) -> RepositoryResult<Vec<String>> {
        let field: DistinctField = field
            .parse()
            .map_err(|_| RepositoryError::UnsupportedDistinctField(field.to_string()))?;
        self.distinct_values_of(field)
    }

    /// 字段去重值（升序，排除 NULL）
    pub fn distinct_values_of(&self, field: DistinctField) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let column = field.column();
        let sql = format!(
            "SELECT DISTINCT {col} FROM exam_results WHERE {col} IS NOT NULL ORDER BY {col} ASC",
            col = column
        );

        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// 已有年份（降序）
    pub fn distinct_years(&self) -> RepositoryResult<Vec<i32>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let mut stmt = conn.prepare("SELECT DISTINCT year FROM exam_results ORDER BY year DESC")?;
        let years = stmt
            .query_map([], |row| row.get::<_, i32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(years)
    }

    /// 已有月份（升序，可限定年份）
    pub fn distinct_months(&self, year: Option<i32>) -> RepositoryResult<Vec<i32>> {
        let conn = self.get_conn()?;
        self.ensure_ready(&conn)?;

        let query = match year {
            Some(year) => FilteredQuery::new("SELECT DISTINCT month FROM exam_results")
                .where_eq("year", year),
            None => FilteredQuery::new("SELECT DISTINCT month FROM exam_results"),
        }
        .order_by("month ASC");

        let mut stmt = conn.prepare(&query.build())?;
        let months = stmt
            .query_map(params_from_iter(query.params()), |row| row.get::<_, i32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(months)
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ExamResultRecord> {
    Ok(ExamResultRecord {
        province: row.get(0)?,
        exam_center: row.get(1)?,
        school_code: row.get(2)?,
        school_name: row.get(3)?,
        section_code: row.get(4)?,
        month: row.get(5)?,
        year: row.get(6)?,
        exam_type: row.get(7)?,
        permit: row.get(8)?,
        num_passed: row.get(9)?,
        num_passed_1st: row.get(10)?,
        num_passed_2nd: row.get(11)?,
        num_passed_3rd_or_4th: row.get(12)?,
        num_passed_5plus: row.get(13)?,
        num_failed: row.get(14)?,
    })
}

fn map_imported_period(row: &Row<'_>) -> rusqlite::Result<ImportedPeriod> {
    let imported_at: String = row.get(2)?;
    let imported_at = DateTime::parse_from_rfc3339(&imported_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(ImportedPeriod {
        year: row.get(0)?,
        month: row.get(1)?,
        imported_at,
        source_file: row.get(3)?,
        row_count: row.get(4)?,
    })
}
