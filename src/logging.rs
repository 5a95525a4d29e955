// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// 支持追加写入本地日志文件
// ==========================================

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// 默认日志文件名
pub const LOG_FILE_NAME: &str = "form_data_import.log";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=form_data_import=trace
///
/// # 示例
/// ```no_run
/// use form_data_import::logging;
/// logging::init();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 配置日志格式
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化日志系统，输出追加写入到指定文件
///
/// # 参数
/// - path: 日志文件路径（父目录不存在时自动创建）
///
/// # 返回
/// - Err: 目录创建/文件打开失败，或全局 subscriber 已设置
pub fn init_with_log_file(path: &Path) -> io::Result<()> {
    let file = open_append(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// 默认日志文件路径: <数据目录>/form-data-import/logs/form_data_import.log
///
/// 无法确定数据目录时退回当前目录下的 var/log
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("form-data-import").join("logs"))
        .unwrap_or_else(|| PathBuf::from("var").join("log"))
        .join(LOG_FILE_NAME)
}

/// 以追加模式打开日志文件
pub fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
