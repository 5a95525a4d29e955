// ==========================================
// 表单数据导入器 - 命令行入口
// ==========================================
// 用法: form-data-import <file> [behavior] [db_path]
//   behavior: delete / replace / append（缺省时读取 config_kv）
//   db_path:  缺省时使用 FORM_DATA_IMPORT_DB_PATH 或用户数据目录
// 输出: 导入结果 JSON（stdout）；日志追加写入本地日志文件
// ==========================================

use anyhow::{bail, Context, Result};
use form_data_import::{db, logging, ImportApi};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        if args.is_empty() {
            bail!("缺少导入文件参数");
        }
        return Ok(());
    }

    // 初始化日志系统（日志文件不可用时退回控制台）
    let log_path = logging::default_log_path();
    if let Err(e) = logging::init_with_log_file(&log_path) {
        logging::init();
        tracing::warn!(path = %log_path.display(), error = %e, "日志文件不可用，改为控制台输出");
    }

    let file = PathBuf::from(&args[0]);
    let behavior = args.get(1).map(String::as_str);
    let db_path = args.get(2).cloned().unwrap_or_else(db::default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", form_data_import::APP_NAME, form_data_import::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let api = ImportApi::new(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;
    let response = api
        .import_file(&file, behavior)
        .with_context(|| format!("导入失败: {}", file.display()))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn print_usage() {
    println!("{} v{}", form_data_import::APP_NAME, form_data_import::VERSION);
    println!();
    println!("用法: form-data-import <file> [behavior] [db_path]");
    println!("  file      .csv / .xlsx / .xls");
    println!("  behavior  delete | replace | append");
    println!("  db_path   SQLite 数据库路径（默认: ${})", db::DB_PATH_ENV);
}
