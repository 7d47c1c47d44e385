// ==========================================
// 驾考统计系统 - 考试结果文件读取器
// ==========================================
// 职责: 文件 → 标准化记录 + 涉及周期
// 流程: 存在性检查 → 编码探测 → 分隔解析 → 表头校验 → 字段映射
// 红线: 任一步骤失败即整体失败，不返回部分结果
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{ExamResultRecord, Period};
use crate::importer::encoding::{decode_with_fallback, TextEncoding};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{ColumnIndex, FieldMapper};
use crate::importer::file_parser::DelimitedTextParser;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// 单个文件的读取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamFileImport {
    /// 标准化记录（保持文件顺序）
    pub records: Vec<ExamResultRecord>,
    /// 记录涉及的 (year, month) 集合（升序）
    pub periods: BTreeSet<Period>,
    /// 实际采用的文本编码
    pub encoding: TextEncoding,
}

impl ExamFileImport {
    fn empty(encoding: TextEncoding) -> Self {
        Self {
            records: Vec::new(),
            periods: BTreeSet::new(),
            encoding,
        }
    }
}

// ==========================================
// ExamFileReader
// ==========================================
pub struct ExamFileReader {
    config: ImportConfig,
}

impl ExamFileReader {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// 读取并解析考试结果文件
    ///
    /// # 返回
    /// - Ok(ExamFileImport): 记录与周期
    /// - Err(ImportError::FileNotFound): 路径不存在（不做任何解码尝试）
    /// - Err(ImportError::DecodingError): 所有候选编码均失败
    /// - Err(ImportError::MissingColumns): 缺少必需列
    /// - Err(ImportError::TypeConversionError): 数值列非整数
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn read<P: AsRef<Path>>(&self, path: P) -> ImportResult<ExamFileImport> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        // === 步骤 1: 检查文件存在 ===
        if !path.exists() {
            return Err(ImportError::FileNotFound(path_str));
        }

        // === 步骤 2: 编码探测 ===
        let bytes = std::fs::read(path)?;
        let (text, encoding) =
            decode_with_fallback(&bytes, &self.config.encodings).map_err(|last| {
                ImportError::DecodingError {
                    path: path_str.clone(),
                    last_error: last
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "未配置候选编码".to_string()),
                }
            })?;
        debug!(encoding = %encoding, bytes = bytes.len(), "文件解码成功");

        // === 步骤 3: 分隔解析 ===
        let parser = DelimitedTextParser::new(self.config.delimiter);
        let table = match parser.parse(&text)? {
            Some(table) => table,
            None => {
                info!("文件为空，无表头");
                return Ok(ExamFileImport::empty(encoding));
            }
        };

        // === 步骤 4: 表头校验 ===
        let columns = ColumnIndex::resolve(&table.headers)?;

        // === 步骤 5: 字段映射 ===
        let mapper = FieldMapper::new(&columns);
        let records = table
            .rows
            .iter()
            .map(|(line, cells)| mapper.map_row(cells, *line))
            .collect::<ImportResult<Vec<_>>>()?;

        let periods: BTreeSet<Period> = records.iter().map(|r| r.period()).collect();

        info!(
            encoding = %encoding,
            records = records.len(),
            periods = periods.len(),
            "考试结果文件读取完成"
        );

        Ok(ExamFileImport {
            records,
            periods,
            encoding,
        })
    }
}

impl Default for ExamFileReader {
    fn default() -> Self {
        Self::new(ImportConfig::default())
    }
}

/// 使用默认配置读取考试结果文件
pub fn read_exam_file<P: AsRef<Path>>(path: P) -> ImportResult<ExamFileImport> {
    ExamFileReader::default().read(path)
}
