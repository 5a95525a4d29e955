// ==========================================
// 表单数据导入器 - 错误聚合器
// ==========================================
// 职责: 按行号/错误码登记错误，回答
//   - 第 N 行是否无效（有错误或已标记跳过）
//   - 是否已触发终止条件
// 终止条件: StopOnErrors 且错误数 >= 允许错误数（至少 1 个错误）
// 说明: 终止条件只用于标记跳过行，不中断扫描
// ==========================================

use crate::domain::import::{ErrorReport, RowError};
use crate::domain::types::ValidationStrategy;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ErrorAggregator {
    validation_strategy: ValidationStrategy,
    allowed_error_count: usize,
    errors: Vec<RowError>,
    seen: HashSet<(Option<usize>, String, Option<String>)>,
    invalid_rows: BTreeSet<usize>,
    skipped_rows: BTreeSet<usize>,
}

impl ErrorAggregator {
    pub fn new(validation_strategy: ValidationStrategy, allowed_error_count: usize) -> Self {
        Self {
            validation_strategy,
            allowed_error_count,
            errors: Vec::new(),
            seen: HashSet::new(),
            invalid_rows: BTreeSet::new(),
            skipped_rows: BTreeSet::new(),
        }
    }

    pub fn validation_strategy(&self) -> ValidationStrategy {
        self.validation_strategy
    }

    pub fn allowed_error_count(&self) -> usize {
        self.allowed_error_count
    }

    /// 登记错误
    ///
    /// 同一 (行号, 错误码, 列) 只登记一次；带行号的错误会使该行无效
    ///
    /// # 返回
    /// - true: 新登记
    /// - false: 重复，已忽略
    pub fn add_error(
        &mut self,
        code: &str,
        row_number: Option<usize>,
        column: Option<&str>,
        message: String,
    ) -> bool {
        let key = (row_number, code.to_string(), column.map(str::to_string));
        if !self.seen.insert(key) {
            return false;
        }

        if let Some(row) = row_number {
            self.invalid_rows.insert(row);
        }

        debug!(code, row_number = ?row_number, column = ?column, "登记导入错误");
        self.errors.push(RowError {
            row_number,
            code: code.to_string(),
            column: column.map(str::to_string),
            message,
        });
        true
    }

    /// 行是否无效（有错误或已标记跳过）
    pub fn is_row_invalid(&self, row_number: usize) -> bool {
        self.invalid_rows.contains(&row_number) || self.skipped_rows.contains(&row_number)
    }

    /// 标记跳过行
    pub fn add_row_to_skip(&mut self, row_number: usize) {
        self.skipped_rows.insert(row_number);
    }

    pub fn is_row_skipped(&self, row_number: usize) -> bool {
        self.skipped_rows.contains(&row_number)
    }

    /// 是否已达到允许错误数
    pub fn is_error_limit_exceeded(&self) -> bool {
        let errors_count = self.errors_count();
        errors_count > 0
            && self.validation_strategy == ValidationStrategy::StopOnErrors
            && errors_count >= self.allowed_error_count
    }

    /// 是否触发终止条件
    pub fn has_to_be_terminated(&self) -> bool {
        self.is_error_limit_exceeded()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors_count(&self) -> usize {
        self.errors.len()
    }

    /// 有错误的行数（不含仅被跳过的行）
    pub fn invalid_rows_count(&self) -> usize {
        self.invalid_rows.len()
    }

    pub fn all_errors(&self) -> &[RowError] {
        &self.errors
    }

    /// 指定行的错误
    pub fn errors_by_row(&self, row_number: usize) -> Vec<&RowError> {
        self.errors
            .iter()
            .filter(|e| e.row_number == Some(row_number))
            .collect()
    }

    /// 指定错误码的错误
    pub fn errors_by_code(&self, code: &str) -> Vec<&RowError> {
        self.errors.iter().filter(|e| e.code == code).collect()
    }

    /// 错误码 → 行号列表（行号升序）
    pub fn rows_grouped_by_error_code(&self) -> BTreeMap<String, Vec<usize>> {
        let mut grouped: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for error in &self.errors {
            if let Some(row) = error.row_number {
                grouped.entry(error.code.clone()).or_default().insert(row);
            }
        }
        grouped
            .into_iter()
            .map(|(code, rows)| (code, rows.into_iter().collect()))
            .collect()
    }

    /// 生成结构化错误报告
    pub fn report(&self) -> ErrorReport {
        let mut rows: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut general = Vec::new();
        for error in &self.errors {
            match error.row_number {
                Some(row) => rows.entry(row).or_default().push(error.code.clone()),
                None => general.push(error.clone()),
            }
        }

        ErrorReport {
            errors_count: self.errors_count(),
            invalid_rows_count: self.invalid_rows_count(),
            rows,
            by_code: self.rows_grouped_by_error_code(),
            skipped_rows: self.skipped_rows.iter().copied().collect(),
            general,
        }
    }

    /// 清空（新一轮运行）
    pub fn clear(&mut self) {
        self.errors.clear();
        self.seen.clear();
        self.invalid_rows.clear();
        self.skipped_rows.clear();
    }
}
