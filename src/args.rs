// ==========================================
// 驾考统计系统 - 命令行参数
// ==========================================
// 筛选参数统一为 key=value，未知键忽略
// ==========================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use driving_exams_stats::domain::ExamFilters;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "driving-exams")]
#[command(about = "驾考统计系统 - 考试结果导入、筛选与汇总")]
#[command(version)]
pub struct Cli {
    /// 数据库路径（覆盖环境变量与默认路径）
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 导入考试结果文件
    Import {
        /// 分号分隔的结果文件
        file: PathBuf,
    },

    /// 按筛选条件列出明细
    Query(FilterArgs),

    /// 合格/不合格总数
    Totals(FilterArgs),

    /// 按考试类型汇总
    ByType(FilterArgs),

    /// 报表数据（标题、筛选描述、总计、表格）
    Report(FilterArgs),

    /// 已有年份
    Years,

    /// 已有月份
    Months {
        /// 限定年份
        year: Option<i32>,
    },

    /// 字段去重值
    Values {
        /// province / exam_center / school_code / school_name / section_code / exam_type / permit
        field: String,
    },

    /// 已导入周期
    Periods,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// 筛选条件 key=value
    /// (year, month, province, exam_center, school_code, exam_type, permit, school_name_contains)
    #[arg(value_name = "KEY=VALUE", value_parser = parse_filter_pair)]
    pub filters: Vec<(String, String)>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> Result<ExamFilters> {
        ExamFilters::from_pairs(self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .context("筛选参数无效")
    }
}

fn parse_filter_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("筛选参数应为 key=value: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_pairs_become_filters() {
        let cli = Cli::try_parse_from([
            "driving-exams",
            "query",
            "year=2024",
            "province=Madrid",
            "school_name_contains=a=b",
            "colour=blue",
        ])
        .unwrap();

        let Commands::Query(args) = cli.command else {
            panic!("Expected query command");
        };
        let filters = args.to_filters().unwrap();
        assert_eq!(filters.year, Some(2024));
        assert_eq!(filters.province.as_deref(), Some("Madrid"));
        assert_eq!(filters.school_name_contains.as_deref(), Some("a=b"));
    }

    #[test]
    fn test_filter_without_equals_is_rejected() {
        assert!(Cli::try_parse_from(["driving-exams", "totals", "Madrid"]).is_err());
    }

    #[test]
    fn test_non_integer_year_is_rejected() {
        let cli = Cli::try_parse_from(["driving-exams", "report", "year=abc"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("Expected report command");
        };
        assert!(args.to_filters().is_err());
    }

    #[test]
    fn test_global_db_and_months() {
        let cli =
            Cli::try_parse_from(["driving-exams", "months", "2024", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Months { year: Some(2024) }));
        assert!(Cli::try_parse_from(["driving-exams", "by-type"]).is_ok());
    }
}
