// ==========================================
// 驾考统计系统 - 文本编码探测
// ==========================================
// 职责: 按固定优先级尝试候选编码，整文件解码成功即采用
// 顺序: UTF-8(可带 BOM) → Windows-1252 → ISO-8859-1
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::importer::error::ImportError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Windows-1252 在 0x80..=0x9F 区间的映射，None 为未定义字节
const CP1252_C1: [Option<char>; 32] = [
    Some('\u{20AC}'), None,             Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None,             Some('\u{017D}'), None,
    None,             Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None,             Some('\u{017E}'), Some('\u{0178}'),
];

/// 默认候选编码（按优先级）
pub const DEFAULT_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8Sig,
    TextEncoding::Windows1252,
    TextEncoding::Latin1,
];

/// 单次解码失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{encoding} 无法解码字节 0x{byte:02X}（偏移 {offset}）")]
pub struct DecodeError {
    pub encoding: TextEncoding,
    pub offset: usize,
    pub byte: u8,
}

// ==========================================
// TextEncoding - 候选文本编码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8，容忍并去除开头的 BOM
    #[serde(rename = "utf-8-sig", alias = "utf-8", alias = "utf8")]
    Utf8Sig,
    /// 西欧单字节编码（Windows 代码页 1252），未定义字节视为失败
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Windows1252,
    /// ISO-8859-1，任意字节均可解码
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Windows1252 => "cp1252",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    /// 将整段字节解码为字符串
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            TextEncoding::Utf8Sig => decode_utf8_sig(bytes),
            TextEncoding::Windows1252 => decode_cp1252(bytes),
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8-sig" | "utf8-sig" | "utf-8" | "utf8" => Ok(TextEncoding::Utf8Sig),
            "cp1252" | "windows-1252" => Ok(TextEncoding::Windows1252),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(ImportError::UnsupportedEncoding(other.to_string())),
        }
    }
}

fn decode_utf8_sig(bytes: &[u8]) -> Result<String, DecodeError> {
    let (body, skipped) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, UTF8_BOM.len()),
        None => (bytes, 0),
    };

    match std::str::from_utf8(body) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => {
            let offset = e.valid_up_to();
            Err(DecodeError {
                encoding: TextEncoding::Utf8Sig,
                offset: offset + skipped,
                byte: body[offset],
            })
        }
    }
}

fn decode_cp1252(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut text = String::with_capacity(bytes.len());
    for (offset, &byte) in bytes.iter().enumerate() {
        let ch = match byte {
            0x80..=0x9F => CP1252_C1[(byte - 0x80) as usize].ok_or(DecodeError {
                encoding: TextEncoding::Windows1252,
                offset,
                byte,
            })?,
            _ => byte as char,
        };
        text.push(ch);
    }
    Ok(text)
}

/// 按优先级依次尝试候选编码
///
/// # 返回
/// - Ok((String, TextEncoding)): 解码文本与采用的编码
/// - Err(Some(DecodeError)): 所有候选均失败时的最后一次错误
/// - Err(None): 候选列表为空
pub fn decode_with_fallback(
    bytes: &[u8],
    candidates: &[TextEncoding],
) -> Result<(String, TextEncoding), Option<DecodeError>> {
    let mut last_error = None;
    for encoding in candidates {
        match encoding.decode(bytes) {
            Ok(text) => return Ok((text, *encoding)),
            Err(e) => {
                tracing::debug!(encoding = %encoding, error = %e, "候选编码解码失败");
                last_error = Some(e);
            }
        }
    }
    Err(last_error)
}
