// ==========================================
// 表单数据导入器 - 导入运行相关实体
// ==========================================
// 职责: 计数器、行错误、错误报告、运行汇总、导入历史
// ==========================================

use crate::domain::types::Behavior;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// ImportCounters - 单次运行计数器
// ==========================================
// created: 无 id 的行；updated: 有 id 的行；deleted: 删除实际影响行数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounters {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ImportCounters {
    /// 按行是否带 id 计入 created / updated（二选一）
    pub fn count_row(&mut self, has_id: bool) {
        if has_id {
            self.updated += 1;
        } else {
            self.created += 1;
        }
    }

    pub fn add_deleted(&mut self, affected: usize) {
        self.deleted += affected;
    }
}

// ==========================================
// RowError - 行错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: Option<usize>, // None: 非行级错误（如表头）
    pub code: String,              // 错误码（如 FirstNameIsRequired）
    pub column: Option<String>,    // 相关列
    pub message: String,           // 模板渲染后的消息
}

// ==========================================
// ErrorReport - 结构化错误报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub errors_count: usize,
    pub invalid_rows_count: usize,
    pub rows: BTreeMap<usize, Vec<String>>,    // 行号 → 错误码列表
    pub by_code: BTreeMap<String, Vec<usize>>, // 错误码 → 行号列表
    pub skipped_rows: Vec<usize>,              // 终止条件触发后标记跳过的行
    pub general: Vec<RowError>,                // 非行级错误
}

impl ErrorReport {
    pub fn is_empty(&self) -> bool {
        self.errors_count == 0 && self.skipped_rows.is_empty()
    }

    /// 指定行的错误码
    pub fn codes_for_row(&self, row_number: usize) -> &[String] {
        self.rows
            .get(&row_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ==========================================
// ValidationSummary - 仅校验（不落库）结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub processed_rows: usize,
    pub invalid_rows: usize,
    pub errors_count: usize,
    pub terminated: bool, // 终止条件是否已触发
    pub report: ErrorReport,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.errors_count == 0
    }
}

// ==========================================
// ImportSummary - 运行汇总（交给调用方）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub entity_code: String,
    pub behavior: String, // 原始行为代码（可能未识别）
    pub counters: ImportCounters,
    pub processed_rows: usize,
    pub invalid_rows: usize,
    pub report: ErrorReport,
}

// ==========================================
// ImportStatus - 导入历史状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Success, // 导入完成
    Invalid, // 校验未通过，未落库
    Failed,  // 读取/写入失败
}

impl ImportStatus {
    pub fn from_db(raw: &str) -> Self {
        match raw.trim() {
            "SUCCESS" => ImportStatus::Success,
            "INVALID" => ImportStatus::Invalid,
            _ => ImportStatus::Failed,
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Success => write!(f, "SUCCESS"),
            ImportStatus::Invalid => write!(f, "INVALID"),
            ImportStatus::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// ImportHistory - 导入历史记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportHistory {
    pub history_id: String,
    pub entity_code: String,
    pub behavior: String,
    pub file_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_count: usize,
    pub updated_count: usize,
    pub deleted_count: usize,
    pub invalid_rows: usize,
    pub error_report_json: Option<String>,
    pub config_snapshot_json: Option<String>, // 本次运行的 config_kv 快照
    pub status: ImportStatus,
}

impl ImportHistory {
    /// 解析 behavior 字段（未识别时返回 None）
    pub fn behavior(&self) -> Option<Behavior> {
        Behavior::from_code(&self.behavior)
    }
}
