// ==========================================
// 驾考统计系统 - 分隔文本解析器
// ==========================================
// 职责: 已解码文本 → 表头 + 数据行
// 规则: 表头去 BOM/首尾空白；全空白行跳过；行长度允许不一致
//       首个物理行为空时表头视为空（不向下寻找表头）
// ==========================================

use crate::importer::error::ImportResult;
use csv::ReaderBuilder;

/// 解析后的表格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// 清洗后的表头
    pub headers: Vec<String>,
    /// 数据行: (源文件行号, 单元格)
    pub rows: Vec<(usize, Vec<String>)>,
}

// ==========================================
// DelimitedTextParser
// ==========================================
pub struct DelimitedTextParser {
    delimiter: u8,
}

impl DelimitedTextParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 解析整段文本
    ///
    /// # 返回
    /// - Ok(Some(ParsedTable)): 至少存在表头行（首行为空时 headers 为空）
    /// - Ok(None): 文本中没有任何行
    /// - Err: CSV 结构错误（如引号不闭合）
    pub fn parse(&self, text: &str) -> ImportResult<Option<ParsedTable>> {
        if text.is_empty() {
            return Ok(None);
        }

        // csv 会跳过空行，首行为空需单独识别
        if starts_with_empty_line(text) {
            return Ok(Some(ParsedTable {
                headers: Vec::new(),
                rows: Vec::new(),
            }));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        let headers = match records.next() {
            Some(header) => header?.iter().map(clean_header).collect::<Vec<_>>(),
            None => return Ok(None),
        };

        let mut rows = Vec::new();
        for result in records {
            let record = result?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();

            // 跳过完全空白的行
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            rows.push((line, cells));
        }

        Ok(Some(ParsedTable { headers, rows }))
    }
}

impl Default for DelimitedTextParser {
    fn default() -> Self {
        Self::new(b';')
    }
}

fn starts_with_empty_line(text: &str) -> bool {
    let text = text.trim_start_matches('\u{feff}');
    text.starts_with('\n') || text.starts_with('\r')
}

/// 表头清洗: 去首尾空白与 BOM
fn clean_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_string()
}
