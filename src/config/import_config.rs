// ==========================================
// 表单数据导入器 - 导入运行配置
// ==========================================
// 存储: config_kv 表（scope_id='global'），缺省值见 Default
// ==========================================

use crate::domain::types::{Behavior, ValidationStrategy};
use serde::{Deserialize, Serialize};

/// 默认每个 bunch 的行数
pub const DEFAULT_BUNCH_SIZE: usize = 100;

/// 默认允许的错误数
pub const DEFAULT_ALLOWED_ERROR_COUNT: usize = 10;

/// 默认 CSV 分隔符
pub const DEFAULT_FIELD_SEPARATOR: u8 = b',';

/// 导入运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 行为代码（delete/replace/append）；保留原始字符串，未识别时由调度器处理
    pub behavior: String,
    pub validation_strategy: ValidationStrategy,
    pub allowed_error_count: usize,
    pub bunch_size: usize,
    pub field_separator: u8,
    /// Replace 时是否将“删 + 写”放在同一事务
    pub atomic_replace: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            behavior: Behavior::Append.code().to_string(),
            validation_strategy: ValidationStrategy::StopOnErrors,
            allowed_error_count: DEFAULT_ALLOWED_ERROR_COUNT,
            bunch_size: DEFAULT_BUNCH_SIZE,
            field_separator: DEFAULT_FIELD_SEPARATOR,
            atomic_replace: false,
        }
    }
}

impl ImportConfig {
    /// 以指定行为创建默认配置
    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior: behavior.code().to_string(),
            ..Self::default()
        }
    }

    /// 已识别的行为（未识别时为 None）
    pub fn parsed_behavior(&self) -> Option<Behavior> {
        Behavior::from_code(&self.behavior)
    }

    /// bunch 行数（至少为 1）
    pub fn effective_bunch_size(&self) -> usize {
        self.bunch_size.max(1)
    }
}
