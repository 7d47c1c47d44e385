// ==========================================
// 驾考统计系统 - 命令行入口
// ==========================================
// 用法:
//   driving-exams import <file>
//   driving-exams query|totals|by-type|report [key=value ...]
//   driving-exams years | months [year] | values <field> | periods
//
// 结果以 JSON 输出到 stdout，日志与提示输出到 stderr
// ==========================================

mod args;

use anyhow::{Context, Result};
use args::{Cli, Commands};
use clap::Parser;
use driving_exams_stats::api::{default_report_file_name, ExamStatsApi, ReportSummary, ResultTable};
use driving_exams_stats::config::AppConfig;
use driving_exams_stats::logging;
use serde::Serialize;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut config = AppConfig::from_env().context("加载配置失败")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    tracing::info!(
        version = driving_exams_stats::VERSION,
        db_path = %config.db_path.display(),
        "{}",
        driving_exams_stats::APP_NAME
    );

    let api = ExamStatsApi::open(&config)
        .with_context(|| format!("无法打开数据库: {}", config.db_path.display()))?;

    match cli.command {
        Commands::Import { file } => {
            let summary = api
                .import_file(&file)
                .with_context(|| format!("导入失败: {}", file.display()))?;
            eprintln!("{}", summary.message());
            print_json(&summary)
        }
        Commands::Query(args) => {
            let view = api.apply_filters(&args.to_filters()?)?;
            eprintln!("{}", view.status_line());
            print_json(&view.rows)
        }
        Commands::Totals(args) => print_json(&api.store().aggregate_totals(&args.to_filters()?)?),
        Commands::ByType(args) => {
            print_json(&api.store().aggregate_by_exam_type(&args.to_filters()?)?)
        }
        Commands::Report(args) => {
            let filters = args.to_filters()?;
            let view = api.apply_filters(&filters)?;
            print_json(&serde_json::json!({
                "file_name": default_report_file_name(&filters),
                "summary": ReportSummary::build(&filters, &view.totals),
                "table": ResultTable::from_records(&view.rows),
            }))
        }
        Commands::Years => print_json(&api.store().distinct_years()?),
        Commands::Months { year } => print_json(&api.store().distinct_months(year)?),
        Commands::Values { field } => print_json(&api.distinct_values(&field)?),
        Commands::Periods => print_json(&api.imported_periods()?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
