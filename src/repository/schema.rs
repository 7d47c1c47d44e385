// ==========================================
// 驾考统计系统 - 数据库 Schema
// ==========================================
// 职责: 建表/建索引（幂等，可在每次启动时执行）
// 表: exam_results / imported_periods
// ==========================================

use rusqlite::Connection;

/// 建表语句（全部使用 IF NOT EXISTS）
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS exam_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    province TEXT NOT NULL,
    exam_center TEXT NOT NULL,
    school_code TEXT NOT NULL,
    school_name TEXT NOT NULL,
    section_code TEXT NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    exam_type TEXT NOT NULL,
    permit TEXT NOT NULL,
    num_passed INTEGER NOT NULL DEFAULT 0,
    num_passed_1st INTEGER NOT NULL DEFAULT 0,
    num_passed_2nd INTEGER NOT NULL DEFAULT 0,
    num_passed_3rd_or_4th INTEGER NOT NULL DEFAULT 0,
    num_passed_5plus INTEGER NOT NULL DEFAULT 0,
    num_failed INTEGER NOT NULL DEFAULT 0,
    UNIQUE (province, exam_center, school_code, section_code, month, year, exam_type, permit)
        ON CONFLICT IGNORE
);

CREATE TABLE IF NOT EXISTS imported_periods (
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    imported_at TEXT NOT NULL,
    source_file TEXT,
    row_count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (year, month)
);

CREATE INDEX IF NOT EXISTS idx_exam_results_period
    ON exam_results (year, month);

CREATE INDEX IF NOT EXISTS idx_exam_results_filters
    ON exam_results (year, month, province, exam_center, exam_type, permit, school_code);
"#;

/// 初始化 schema
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
