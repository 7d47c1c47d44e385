// ==========================================
// 驾考统计系统 - 字段映射器
// ==========================================
// 职责: 源列名 → ExamResultRecord 字段 + 类型转换
// 规则: 文本 TRIM（不改大小写）；数值空值按 0，非整数报错
// ==========================================

use crate::domain::ExamResultRecord;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

// ===== 源文件列名 =====
pub const COL_PROVINCE: &str = "DESC_PROVINCIA";
pub const COL_EXAM_CENTER: &str = "CENTRO_EXAMEN";
pub const COL_SCHOOL_CODE: &str = "CODIGO_AUTOESCUELA";
pub const COL_SCHOOL_NAME: &str = "NOMBRE_AUTOESCUELA";
pub const COL_SECTION_CODE: &str = "CODIGO_SECCION";
pub const COL_MONTH: &str = "MES";
pub const COL_YEAR: &str = "ANYO";
pub const COL_EXAM_TYPE: &str = "TIPO_EXAMEN";
pub const COL_PERMIT: &str = "NOMBRE_PERMISO";
pub const COL_PASSED: &str = "NUM_APTOS";
pub const COL_PASSED_1ST: &str = "NUM_APTOS_1conv";
pub const COL_PASSED_2ND: &str = "NUM_APTOS_2conv";
pub const COL_PASSED_3RD_OR_4TH: &str = "NUM_APTOS_3o4conv";
pub const COL_PASSED_5PLUS: &str = "NUM_APTOS_5_o_mas_conv";
pub const COL_FAILED: &str = "NUM_NO_APTOS";

/// 必需列（顺序即缺列报错时的列出顺序）
pub const REQUIRED_COLUMNS: [&str; 15] = [
    COL_PROVINCE,
    COL_EXAM_CENTER,
    COL_SCHOOL_CODE,
    COL_SCHOOL_NAME,
    COL_SECTION_CODE,
    COL_MONTH,
    COL_YEAR,
    COL_EXAM_TYPE,
    COL_PERMIT,
    COL_PASSED,
    COL_PASSED_1ST,
    COL_PASSED_2ND,
    COL_PASSED_3RD_OR_4TH,
    COL_PASSED_5PLUS,
    COL_FAILED,
];

// ==========================================
// ColumnIndex - 列名 → 列位置
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// 由表头建立索引并校验必需列
    ///
    /// # 说明
    /// - 重名列以最后一次出现为准
    /// - 未知列忽略
    /// - 缺任一必需列即报错，列出全部缺失列
    pub fn resolve(headers: &[String]) -> ImportResult<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !positions.contains_key(**col))
            .map(|col| col.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    fn position(&self, column: &str) -> usize {
        // resolve 已保证必需列存在
        self.positions.get(column).copied().unwrap_or(usize::MAX)
    }
}

// ==========================================
// FieldMapper
// ==========================================
pub struct FieldMapper<'a> {
    columns: &'a ColumnIndex,
}

impl<'a> FieldMapper<'a> {
    pub fn new(columns: &'a ColumnIndex) -> Self {
        Self { columns }
    }

    /// 将一行映射为考试结果记录
    ///
    /// # 参数
    /// - row: 单元格列表
    /// - row_number: 源文件行号（用于报错定位）
    pub fn map_row(&self, row: &[String], row_number: usize) -> ImportResult<ExamResultRecord> {
        Ok(ExamResultRecord {
            province: self.get_string(row, COL_PROVINCE),
            exam_center: self.get_string(row, COL_EXAM_CENTER),
            school_code: self.get_string(row, COL_SCHOOL_CODE),
            school_name: self.get_string(row, COL_SCHOOL_NAME),
            section_code: self.get_string(row, COL_SECTION_CODE),
            month: self.parse_int(row, COL_MONTH, row_number)?,
            year: self.parse_int(row, COL_YEAR, row_number)?,
            exam_type: self.get_string(row, COL_EXAM_TYPE),
            permit: self.get_string(row, COL_PERMIT),
            num_passed: self.parse_int(row, COL_PASSED, row_number)?,
            num_passed_1st: self.parse_int(row, COL_PASSED_1ST, row_number)?,
            num_passed_2nd: self.parse_int(row, COL_PASSED_2ND, row_number)?,
            num_passed_3rd_or_4th: self.parse_int(row, COL_PASSED_3RD_OR_4TH, row_number)?,
            num_passed_5plus: self.parse_int(row, COL_PASSED_5PLUS, row_number)?,
            num_failed: self.parse_int(row, COL_FAILED, row_number)?,
        })
    }

    /// 提取并 TRIM 单元格，越界视为空
    fn get_cell<'r>(&self, row: &'r [String], column: &str) -> &'r str {
        row.get(self.columns.position(column))
            .map(|v| v.trim())
            .unwrap_or("")
    }

    fn get_string(&self, row: &[String], column: &str) -> String {
        self.get_cell(row, column).to_string()
    }

    /// 解析整数，空值按 0
    fn parse_int<T: std::str::FromStr + Default>(
        &self,
        row: &[String],
        column: &str,
        row_number: usize,
    ) -> ImportResult<T> {
        let value = self.get_cell(row, column);
        if value.is_empty() {
            return Ok(T::default());
        }

        value
            .parse::<T>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row_number,
                field: column.to_string(),
                value: value.to_string(),
            })
    }
}
