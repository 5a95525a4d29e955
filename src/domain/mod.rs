// ==========================================
// 表单数据导入器 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod form_data;
pub mod import;
pub mod types;

// 重导出核心类型
pub use form_data::{EntityBatch, FormDataEntity, FormDataRow};
pub use import::{
    ErrorReport, ImportCounters, ImportHistory, ImportStatus, ImportSummary, RowError,
    ValidationSummary,
};
pub use types::{Behavior, FormDataColumn, ValidationStrategy};
