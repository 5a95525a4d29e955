// ==========================================
// 表单数据导入器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite)
// 功能: CSV/Excel 分批读取 → 行校验 → delete/replace/append 落库
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 批次读取/校验/写入
pub mod importer;

// 配置层 - 导入运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 导入入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Behavior, FormDataColumn, ValidationStrategy};

// 领域实体
pub use domain::{
    EntityBatch, ErrorReport, FormDataEntity, FormDataRow, ImportCounters, ImportHistory,
    ImportStatus, ImportSummary, RowError, ValidationSummary,
};

// 导入器
pub use importer::{
    BunchReader, ErrorAggregator, FormDataImporter, FormDataImporterImpl, ImportError,
    ImportResult, RowValidator,
};

// 配置
pub use config::{ConfigManager, ImportConfig};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "表单数据导入器";
