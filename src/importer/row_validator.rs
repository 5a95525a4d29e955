// ==========================================
// 表单数据导入器 - 行校验器
// ==========================================
// 规则: 10 个必填列逐一检查（不短路），每个缺失列登记一个错误码
// 幂等: 同一行号在一次运行内只标记一次；重复校验不会重复登记错误
// 说明: 校验从不返回错误，结果通过 bool 与 ErrorAggregator 状态体现
// ==========================================

use crate::domain::form_data::FormDataRow;
use crate::domain::types::FormDataColumn;
use crate::i18n;
use crate::importer::error_aggregator::ErrorAggregator;
use std::collections::HashSet;
use tracing::trace;

#[derive(Debug, Default)]
pub struct RowValidator {
    validated: HashSet<usize>,
}

impl RowValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验一行
    ///
    /// # 返回
    /// - true: 行可用（无错误且未被标记跳过）
    pub fn validate(
        &mut self,
        row: &FormDataRow,
        row_number: usize,
        errors: &mut ErrorAggregator,
    ) -> bool {
        for column in FormDataColumn::REQUIRED {
            if !row.is_blank(column) {
                continue;
            }
            if let Some(code) = column.required_error_code() {
                errors.add_error(
                    code,
                    Some(row_number),
                    Some(column.as_str()),
                    i18n::error_message(code),
                );
            }
        }

        if !self.validated.insert(row_number) {
            trace!(row_number, "行已校验过");
        }

        !errors.is_row_invalid(row_number)
    }

    pub fn is_validated(&self, row_number: usize) -> bool {
        self.validated.contains(&row_number)
    }

    pub fn validated_count(&self) -> usize {
        self.validated.len()
    }

    pub fn clear(&mut self) {
        self.validated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ValidationStrategy;
    use std::collections::HashMap;

    fn complete_row() -> HashMap<String, String> {
        [
            ("first_name", "Jo"),
            ("last_name", "Doe"),
            ("gender", "F"),
            ("email", "j@x.com"),
            ("adress1", "1 St"),
            ("adress2", "Apt 2"),
            ("city", "NY"),
            ("state", "NY"),
            ("zip_code", "10001"),
            ("feedback", "ok"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn aggregator() -> ErrorAggregator {
        ErrorAggregator::new(ValidationStrategy::SkipErrors, 100)
    }

    #[test]
    fn test_complete_row_is_valid() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();

        let row = FormDataRow::from_record(&complete_row());
        assert!(validator.validate(&row, 1, &mut errors));
        assert!(!errors.has_errors());
        assert!(validator.is_validated(1));
    }

    #[test]
    fn test_missing_adress2_registers_one_error() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();

        let mut record = complete_row();
        record.insert("adress2".to_string(), "".to_string());
        let row = FormDataRow::from_record(&record);

        assert!(!validator.validate(&row, 4, &mut errors));
        assert_eq!(errors.errors_count(), 1);
        assert_eq!(errors.all_errors()[0].code, "Adress2IsRequired");
        assert_eq!(errors.all_errors()[0].row_number, Some(4));
    }

    #[test]
    fn test_all_checks_run_without_short_circuit() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();

        let row = FormDataRow::from_record(&HashMap::new());
        assert!(!validator.validate(&row, 1, &mut errors));
        assert_eq!(errors.errors_by_row(1).len(), 10);
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();

        let mut record = complete_row();
        record.insert("city".to_string(), "   ".to_string());
        let row = FormDataRow::from_record(&record);

        assert!(!validator.validate(&row, 2, &mut errors));
        assert_eq!(errors.errors_by_code("CityIsRequired").len(), 1);
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();

        let mut record = complete_row();
        record.remove("email");
        record.remove("state");
        let row = FormDataRow::from_record(&record);

        assert!(!validator.validate(&row, 9, &mut errors));
        assert!(!validator.validate(&row, 9, &mut errors));
        assert_eq!(errors.errors_count(), 2);
        assert_eq!(validator.validated_count(), 1);
    }

    #[test]
    fn test_skipped_row_is_not_usable() {
        let mut validator = RowValidator::new();
        let mut errors = aggregator();
        errors.add_row_to_skip(3);

        let row = FormDataRow::from_record(&complete_row());
        assert!(!validator.validate(&row, 3, &mut errors));
        assert!(!errors.has_errors());
    }
}
