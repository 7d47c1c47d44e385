// ==========================================
// 驾考统计系统 - 导入层
// ==========================================
// 职责: 外部分隔文本文件 → 标准化考试结果记录
// 支持: 分号分隔 CSV/TXT，UTF-8 / Windows-1252 / ISO-8859-1
// ==========================================

// 模块声明
pub mod encoding;
pub mod error;
pub mod exam_file_reader;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use encoding::{DecodeError, TextEncoding, DEFAULT_ENCODINGS};
pub use error::{ImportError, ImportResult};
pub use exam_file_reader::{read_exam_file, ExamFileImport, ExamFileReader};
pub use field_mapper::{ColumnIndex, FieldMapper, REQUIRED_COLUMNS};
pub use file_parser::{DelimitedTextParser, ParsedTable};
