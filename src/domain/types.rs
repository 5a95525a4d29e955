// ==========================================
// 表单数据导入器 - 领域类型定义
// ==========================================
// 职责: 导入行为、校验策略、固定列集合
// 红线: 列名拼写（adress1/adress2）属于外部契约，不得“修正”
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入行为 (Behavior)
// ==========================================
// 运行级参数: delete / replace / append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Delete,  // 按 id 删除
    Replace, // 先删后插（逐批）
    Append,  // 仅插入（id 冲突时覆盖）
}

impl Behavior {
    /// 行为代码（与外部导入框架一致）
    pub fn code(&self) -> &'static str {
        match self {
            Behavior::Delete => "delete",
            Behavior::Replace => "replace",
            Behavior::Append => "append",
        }
    }

    /// 从行为代码解析
    ///
    /// # 返回
    /// - None: 未识别的行为代码（由调度器按“静默成功”处理）
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "delete" => Some(Behavior::Delete),
            "replace" => Some(Behavior::Replace),
            "append" => Some(Behavior::Append),
            _ => None,
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 校验策略 (Validation Strategy)
// ==========================================
// StopOnErrors: 错误数达到允许上限后触发终止条件
// SkipErrors:   从不触发终止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStrategy {
    #[serde(rename = "validation-stop-on-errors")]
    StopOnErrors,
    #[serde(rename = "validation-skip-errors")]
    SkipErrors,
}

impl ValidationStrategy {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationStrategy::StopOnErrors => "validation-stop-on-errors",
            ValidationStrategy::SkipErrors => "validation-skip-errors",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "validation-stop-on-errors" => Some(ValidationStrategy::StopOnErrors),
            "validation-skip-errors" => Some(ValidationStrategy::SkipErrors),
            _ => None,
        }
    }
}

impl Default for ValidationStrategy {
    fn default() -> Self {
        ValidationStrategy::StopOnErrors
    }
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 固定列集合 (Form Data Column)
// ==========================================
// 顺序即 schema 顺序，写入载荷按此顺序组装
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormDataColumn {
    Id,
    FirstName,
    LastName,
    Gender,
    Email,
    Adress1,
    Adress2,
    City,
    State,
    ZipCode,
    Feedback,
}

impl FormDataColumn {
    /// 全部有效列（schema 顺序）
    pub const ALL: [FormDataColumn; 11] = [
        FormDataColumn::Id,
        FormDataColumn::FirstName,
        FormDataColumn::LastName,
        FormDataColumn::Gender,
        FormDataColumn::Email,
        FormDataColumn::Adress1,
        FormDataColumn::Adress2,
        FormDataColumn::City,
        FormDataColumn::State,
        FormDataColumn::ZipCode,
        FormDataColumn::Feedback,
    ];

    /// 必填列（id 除外）
    pub const REQUIRED: [FormDataColumn; 10] = [
        FormDataColumn::FirstName,
        FormDataColumn::LastName,
        FormDataColumn::Gender,
        FormDataColumn::Email,
        FormDataColumn::Adress1,
        FormDataColumn::Adress2,
        FormDataColumn::City,
        FormDataColumn::State,
        FormDataColumn::ZipCode,
        FormDataColumn::Feedback,
    ];

    /// 常驻列（表头中必须出现）
    pub const PERMANENT: [FormDataColumn; 1] = [FormDataColumn::Id];

    /// 源文件/数据表中的列名
    pub fn as_str(&self) -> &'static str {
        match self {
            FormDataColumn::Id => "id",
            FormDataColumn::FirstName => "first_name",
            FormDataColumn::LastName => "last_name",
            FormDataColumn::Gender => "gender",
            FormDataColumn::Email => "email",
            FormDataColumn::Adress1 => "adress1",
            FormDataColumn::Adress2 => "adress2",
            FormDataColumn::City => "city",
            FormDataColumn::State => "state",
            FormDataColumn::ZipCode => "zip_code",
            FormDataColumn::Feedback => "feedback",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// 必填校验失败时登记的错误码
    ///
    /// # 返回
    /// - None: id 列不参与必填校验
    pub fn required_error_code(&self) -> Option<&'static str> {
        match self {
            FormDataColumn::Id => None,
            FormDataColumn::FirstName => Some("FirstNameIsRequired"),
            FormDataColumn::LastName => Some("LastNameIsRequired"),
            FormDataColumn::Gender => Some("GenderIsRequired"),
            FormDataColumn::Email => Some("EmailIsRequired"),
            FormDataColumn::Adress1 => Some("Adress1IsRequired"),
            FormDataColumn::Adress2 => Some("Adress2IsRequired"),
            FormDataColumn::City => Some("CityIsRequired"),
            FormDataColumn::State => Some("StateIsRequired"),
            FormDataColumn::ZipCode => Some("ZipCodeIsRequired"),
            FormDataColumn::Feedback => Some("FeedbackIsRequired"),
        }
    }

    /// 有效列名列表（schema 顺序）
    pub fn valid_column_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl fmt::Display for FormDataColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
