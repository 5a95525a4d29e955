// ==========================================
// 表单数据导入器 - API 层
// ==========================================
// 职责: 提供导入入口，供命令行调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{is_known_behavior, ImportApi, ImportApiResponse};
