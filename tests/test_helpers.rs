// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库、样例文件与记录构造
// ==========================================

#![allow(dead_code)]

use driving_exams_stats::domain::ExamResultRecord;
use driving_exams_stats::repository::ExamStatsStore;
use std::error::Error;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// 标准表头（15 列）
pub const HEADER: &str = "DESC_PROVINCIA;CENTRO_EXAMEN;CODIGO_AUTOESCUELA;NOMBRE_AUTOESCUELA;\
CODIGO_SECCION;MES;ANYO;TIPO_EXAMEN;NOMBRE_PERMISO;NUM_APTOS;NUM_APTOS_1conv;NUM_APTOS_2conv;\
NUM_APTOS_3o4conv;NUM_APTOS_5_o_mas_conv;NUM_NO_APTOS";

/// 样例数据行: 2024-01 两行、2024-02 一行、2023-12 一行
///
/// 合格合计 24，不合格合计 11
pub const SAMPLE_ROWS: [&str; 4] = [
    "Madrid;Alcorcón;A001;Autoescuela Sol;1;1;2024;PRUEBA CONTROL DE CIRCULACION;B;10;6;2;1;1;5",
    "Madrid;Alcorcón;A001;Autoescuela Sol;1;1;2024;PRUEBA DESTREZA;B;4;4;0;0;0;1",
    "Cádiz;Jerez;C002;Autoescuela Ñandú;2;2;2024;PRUEBA CONTROL DE CIRCULACION;A2;3;1;1;1;0;2",
    "Madrid;Móstoles;A003;Escuela Norte;1;12;2023;PRUEBA TEORICA;B;7;5;1;1;0;3",
];

pub const SAMPLE_PASSED: i64 = 24;
pub const SAMPLE_FAILED: i64 = 11;

/// 拼接表头与数据行
pub fn sample_text(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// 以 Windows-1252 编码文本（仅支持 U+0000..=U+00FF 中与 Latin-1 重合的字符）
pub fn to_cp1252(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            assert!(
                code < 0x80 || (0xA0..=0xFF).contains(&code),
                "测试文本包含无法直接映射的字符: {}",
                c
            );
            code as u8
        })
        .collect()
}

/// 在临时目录中写入文件
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - PathBuf: 文件路径
pub fn write_fixture(name: &str, bytes: &[u8]) -> Result<(TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, bytes)?;
    Ok((dir, path))
}

/// 写入 UTF-8 样例文件（全部样例行）
pub fn write_sample_file() -> Result<(TempDir, PathBuf), Box<dyn Error>> {
    write_fixture("exams_utf8.csv", sample_text(&SAMPLE_ROWS).as_bytes())
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - ExamStatsStore: 已就绪的存储
pub fn create_test_store() -> Result<(NamedTempFile, ExamStatsStore), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let store = ExamStatsStore::open(temp_file.path())?;
    store.initialize()?;
    Ok((temp_file, store))
}

/// 构造考试结果记录
pub fn record(
    province: &str,
    school_code: &str,
    year: i32,
    month: i32,
    exam_type: &str,
    passed: i64,
    failed: i64,
) -> ExamResultRecord {
    ExamResultRecord {
        province: province.to_string(),
        exam_center: format!("Centro {}", province),
        school_code: school_code.to_string(),
        school_name: format!("Autoescuela {}", school_code),
        section_code: "1".to_string(),
        month,
        year,
        exam_type: exam_type.to_string(),
        permit: "B".to_string(),
        num_passed: passed,
        num_passed_1st: passed,
        num_passed_2nd: 0,
        num_passed_3rd_or_4th: 0,
        num_passed_5plus: 0,
        num_failed: failed,
    }
}
