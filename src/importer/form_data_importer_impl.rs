// ==========================================
// 表单数据导入器 - 导入器实现
// ==========================================
// 流程:
//   validate_data: 表头校验 → 逐批逐行校验（不落库）
//   import_data:   表头校验 → 按 behavior 分发
//     - delete:          全量收集 id → 结束后一次性删除
//     - replace/append:  逐批收集载荷 → 批末写入（replace 先删后写）
// 终止条件: 只把行标记为跳过，始终读完整个数据源
// 写入失败: 本批各行登记 RowNotSaved 错误，继续读取后续批次
// ==========================================

use crate::config::ImportConfig;
use crate::domain::form_data::EntityBatch;
use crate::domain::import::{ImportCounters, ImportSummary, ValidationSummary};
use crate::domain::types::{Behavior, FormDataColumn};
use crate::importer::entity_writer::{dedup_ids, EntityWriter, WriteError};
use crate::importer::error::ImportResult;
use crate::importer::error_aggregator::ErrorAggregator;
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::form_data_importer_trait::{
    BunchReader, FieldMapper, FormDataImporter, RawRecord,
};
use crate::importer::row_validator::RowValidator;
use crate::i18n;
use crate::repository::form_data_repo::FormDataRepository;
use tracing::{debug, error, info, instrument, warn};

/// 实体类型代码
pub const ENTITY_CODE: &str = "formdata";

/// 目标表
pub const TABLE: &str = crate::db::FORM_DATA_TABLE;

/// 存储拒绝写入时登记在本批各行上的错误码
pub const ROW_NOT_SAVED: &str = "RowNotSaved";

// ==========================================
// FormDataImporterImpl
// ==========================================
pub struct FormDataImporterImpl<R>
where
    R: FormDataRepository,
{
    // 写入端
    writer: EntityWriter<R>,

    // 运行配置
    config: ImportConfig,

    // 导入组件
    field_mapper: Box<dyn FieldMapper>,
    validator: RowValidator,
    errors: ErrorAggregator,

    // 运行状态
    counters: ImportCounters,
    processed_rows: usize,
    replace_ids: Vec<String>, // 仅 Replace: 运行内已收集的 id（跨批累积）
}

impl<R> FormDataImporterImpl<R>
where
    R: FormDataRepository,
{
    /// 创建导入器
    ///
    /// # 参数
    /// - repo: form_data 仓储
    /// - config: 运行配置
    pub fn new(repo: R, config: ImportConfig) -> Self {
        let errors = ErrorAggregator::new(config.validation_strategy, config.allowed_error_count);
        Self {
            writer: EntityWriter::new(repo),
            config,
            field_mapper: Box::new(FieldMapperImpl),
            validator: RowValidator::new(),
            errors,
            counters: ImportCounters::default(),
            processed_rows: 0,
            replace_ids: Vec::new(),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn counters(&self) -> ImportCounters {
        self.counters
    }

    pub fn error_aggregator(&self) -> &ErrorAggregator {
        &self.errors
    }

    pub fn repository(&self) -> &R {
        self.writer.repository()
    }

    /// 有效列名（schema 顺序）
    pub fn valid_column_names(&self) -> Vec<&'static str> {
        FormDataColumn::valid_column_names()
    }

    /// 校验单行（可重复调用，错误不会重复登记）
    pub fn validate_row(&mut self, record: &RawRecord, row_number: usize) -> bool {
        let row = self.field_mapper.map_to_row(record);
        self.validator.validate(&row, row_number, &mut self.errors)
    }

    fn check_columns(&self, source: &dyn BunchReader) -> ImportResult<()> {
        self.field_mapper.check_columns(source.headers())
    }

    // ==========================================
    // Delete 流程
    // ==========================================
    // 运行结束后对去重 id 发起一次删除
    // 返回: 删除调用是否成功执行
    #[instrument(skip(self, source))]
    fn delete_entity(&mut self, source: &mut dyn BunchReader) -> ImportResult<bool> {
        let mut ids: Vec<String> = Vec::new();
        let mut bunch_index = 0;

        while let Some(bunch) = source.next_bunch()? {
            bunch_index += 1;
            debug!(bunch_index, rows = bunch.len(), "处理 delete 批次");

            for (row_number, record) in bunch {
                self.processed_rows += 1;
                let row = self.field_mapper.map_to_row(&record);
                self.validator.validate(&row, row_number, &mut self.errors);

                if !self.errors.is_row_invalid(row_number) {
                    if let Some(id) = row.entity_id() {
                        ids.push(id);
                    }
                }

                if self.errors.has_to_be_terminated() {
                    self.errors.add_row_to_skip(row_number);
                }
            }
        }

        if ids.is_empty() {
            info!("未收集到需要删除的 id");
            return Ok(false);
        }

        let unique = dedup_ids(&ids);
        match self.writer.delete_by_ids(&unique, &mut self.counters) {
            Ok(affected) => {
                info!(ids = unique.len(), affected, "delete 完成");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    // ==========================================
    // Replace / Append 流程
    // ==========================================
    // 每批结束时写入，载荷不跨批累积
    #[instrument(skip(self, source))]
    fn save_and_replace_entity(
        &mut self,
        source: &mut dyn BunchReader,
        behavior: Behavior,
    ) -> ImportResult<()> {
        let mut bunch_index = 0;

        while let Some(bunch) = source.next_bunch()? {
            bunch_index += 1;
            let mut batch = EntityBatch::new();
            let mut batch_rows: Vec<(usize, bool)> = Vec::new(); // (行号, 是否带 id)

            for (row_number, record) in bunch {
                self.processed_rows += 1;
                let row = self.field_mapper.map_to_row(&record);

                if !self.validator.validate(&row, row_number, &mut self.errors) {
                    continue;
                }

                if self.errors.has_to_be_terminated() {
                    self.errors.add_row_to_skip(row_number);
                    continue;
                }

                let id = row.entity_id();
                batch_rows.push((row_number, id.is_some()));
                if behavior == Behavior::Replace {
                    if let Some(id) = id {
                        self.replace_ids.push(id);
                    }
                }
                batch.push(row.to_entity());
            }

            debug!(bunch_index, payloads = batch.len(), "批次分类完成");

            let written = match behavior {
                Behavior::Replace => self.flush_replace(batch),
                Behavior::Append => self.writer.upsert_batch(batch).map(|_| ()),
                Behavior::Delete => Ok(()),
            };

            match written {
                Ok(()) => {
                    for &(_, has_id) in &batch_rows {
                        self.counters.count_row(has_id);
                    }
                }
                Err(e) => self.reject_bunch(bunch_index, &batch_rows, &e),
            }
        }

        info!(
            behavior = %behavior,
            created = self.counters.created,
            updated = self.counters.updated,
            deleted = self.counters.deleted,
            "导入完成"
        );
        Ok(())
    }

    /// Replace 批末写入: 删除已收集 id，删除成功（或无 id 可删）后写入本批载荷
    ///
    /// 删除失败只跳过本批写入；Err 仅表示存储拒绝了本批载荷
    fn flush_replace(&mut self, batch: EntityBatch) -> Result<(), WriteError> {
        let ids = dedup_ids(&self.replace_ids);

        if ids.is_empty() {
            return self.writer.upsert_batch(batch).map(|_| ());
        }

        if self.config.atomic_replace {
            return self.writer.replace(&ids, batch, &mut self.counters).map(|_| ());
        }

        match self.writer.delete_by_ids(&ids, &mut self.counters) {
            Ok(_) | Err(WriteError::NothingToDelete) => self.writer.upsert_batch(batch).map(|_| ()),
            Err(WriteError::Store(_)) => {
                warn!(payloads = batch.len(), "删除失败，跳过本批写入");
                Ok(())
            }
        }
    }

    /// 存储拒绝本批写入: 逐行登记错误，不计入 created/updated
    fn reject_bunch(&mut self, bunch_index: usize, batch_rows: &[(usize, bool)], err: &WriteError) {
        error!(bunch_index, rows = batch_rows.len(), error = %err, "本批写入失败，继续处理后续批次");

        let reason = err.to_string();
        let message = i18n::t_with_args(
            &format!("import.errors.{}", ROW_NOT_SAVED),
            &[("error", reason.as_str())],
        );
        for &(row_number, _) in batch_rows {
            self.errors
                .add_error(ROW_NOT_SAVED, Some(row_number), None, message.clone());
        }
    }
}

impl<R> FormDataImporter for FormDataImporterImpl<R>
where
    R: FormDataRepository,
{
    #[instrument(skip(self, source))]
    fn validate_data(&mut self, source: &mut dyn BunchReader) -> ImportResult<ValidationSummary> {
        source.rewind()?;
        self.check_columns(source)?;
        self.processed_rows = 0;

        while let Some(bunch) = source.next_bunch()? {
            for (row_number, record) in bunch {
                self.processed_rows += 1;

                if self.errors.has_to_be_terminated() {
                    self.errors.add_row_to_skip(row_number);
                }

                let row = self.field_mapper.map_to_row(&record);
                self.validator.validate(&row, row_number, &mut self.errors);
            }
        }

        let summary = ValidationSummary {
            processed_rows: self.processed_rows,
            invalid_rows: self.errors.invalid_rows_count(),
            errors_count: self.errors.errors_count(),
            terminated: self.errors.has_to_be_terminated(),
            report: self.errors.report(),
        };

        info!(
            processed_rows = summary.processed_rows,
            invalid_rows = summary.invalid_rows,
            errors_count = summary.errors_count,
            terminated = summary.terminated,
            "校验完成"
        );
        Ok(summary)
    }

    #[instrument(skip(self, source), fields(behavior = %self.config.behavior))]
    fn import_data(&mut self, source: &mut dyn BunchReader) -> ImportResult<bool> {
        source.rewind()?;
        self.check_columns(source)?;
        self.processed_rows = 0;

        match self.config.parsed_behavior() {
            Some(Behavior::Delete) => self.delete_entity(source),
            Some(behavior) => {
                self.save_and_replace_entity(source, behavior)?;
                Ok(true)
            }
            None => {
                warn!(behavior = %self.config.behavior, "未识别的导入行为，未执行任何写入");
                Ok(true)
            }
        }
    }

    fn summary(&self) -> ImportSummary {
        ImportSummary {
            entity_code: ENTITY_CODE.to_string(),
            behavior: self.config.behavior.clone(),
            counters: self.counters,
            processed_rows: self.processed_rows,
            invalid_rows: self.errors.invalid_rows_count(),
            report: self.errors.report(),
        }
    }

    fn reset(&mut self) {
        self.errors.clear();
        self.validator.clear();
        self.counters = ImportCounters::default();
        self.processed_rows = 0;
        self.replace_ids.clear();
    }

    fn entity_type_code(&self) -> &'static str {
        ENTITY_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ValidationStrategy;
    use crate::importer::bunch_reader::MemoryBunchReader;
    use crate::importer::error::ImportError;
    use crate::importer::mock_repo::{MockFormDataRepository, RepoCall};

    const HEADERS: [&str; 11] = [
        "id", "first_name", "last_name", "gender", "email", "adress1", "adress2", "city",
        "state", "zip_code", "feedback",
    ];

    /// 完整行，first_name 用于在调用记录中识别载荷
    fn row(id: &str, first_name: &str) -> Vec<String> {
        [
            id, first_name, "Doe", "F", "j@x.com", "1 St", "Apt 2", "NY", "NY", "10001", "ok",
        ]
        .iter()
        .map(|v| v.to_string())
        .collect()
    }

    fn source(rows: Vec<Vec<String>>, bunch_size: usize) -> MemoryBunchReader {
        MemoryBunchReader::from_rows(&HEADERS, &rows, bunch_size)
    }

    fn importer(
        repo: &MockFormDataRepository,
        behavior: Behavior,
    ) -> FormDataImporterImpl<MockFormDataRepository> {
        let config = ImportConfig {
            validation_strategy: ValidationStrategy::SkipErrors,
            ..ImportConfig::with_behavior(behavior)
        };
        FormDataImporterImpl::new(repo.clone(), config)
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_row_missing_adress2_is_excluded_from_write() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut bad = row("", "Jo");
        bad[6] = String::new();
        let mut src = source(vec![bad, row("", "Al")], 10);

        assert!(importer.import_data(&mut src).unwrap());

        let summary = importer.summary();
        assert_eq!(summary.report.codes_for_row(1), ["Adress2IsRequired"]);
        assert_eq!(repo.calls(), vec![RepoCall::Upsert(names(&["Al"]))]);
        assert_eq!(summary.counters.created, 1);
    }

    #[test]
    fn test_delete_collects_ids_across_bunches_and_deletes_once() {
        let repo = MockFormDataRepository::with_rows(&[1, 2, 3]);
        let mut importer = importer(&repo, Behavior::Delete);

        let mut src = source(vec![row("1", "a"), row("2", "b"), row("1", "c")], 2);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(repo.calls(), vec![RepoCall::Delete(names(&["1", "2"]))]);
        assert_eq!(importer.counters().deleted, 2);
        assert_eq!(importer.counters().created + importer.counters().updated, 0);
        assert!(repo.has_row(3));
    }

    #[test]
    fn test_delete_counts_only_rows_actually_removed() {
        let repo = MockFormDataRepository::with_rows(&[1]);
        let mut importer = importer(&repo, Behavior::Delete);

        let mut src = source(vec![row("1", "a"), row("42", "b")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(importer.counters().deleted, 1);
    }

    #[test]
    fn test_delete_without_ids_returns_false() {
        let repo = MockFormDataRepository::with_rows(&[1]);
        let mut importer = importer(&repo, Behavior::Delete);

        let mut invalid = row("1", "a");
        invalid[4] = String::new();
        let mut src = source(vec![row("", "new"), invalid], 10);

        assert!(!importer.import_data(&mut src).unwrap());
        assert!(repo.calls().is_empty());
        assert!(repo.has_row(1));
    }

    #[test]
    fn test_delete_failure_returns_false() {
        let repo = MockFormDataRepository::with_rows(&[1]);
        repo.fail_deletes();
        let mut importer = importer(&repo, Behavior::Delete);

        let mut src = source(vec![row("1", "a")], 10);

        assert!(!importer.import_data(&mut src).unwrap());
        assert_eq!(importer.counters().deleted, 0);
    }

    #[test]
    fn test_replace_deletes_then_inserts() {
        let repo = MockFormDataRepository::with_rows(&[5]);
        let mut importer = importer(&repo, Behavior::Replace);

        let mut src = source(vec![row("5", "old"), row("", "new")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(
            repo.calls(),
            vec![
                RepoCall::Delete(names(&["5"])),
                RepoCall::Upsert(names(&["old", "new"])),
            ]
        );

        let counters = importer.counters();
        assert_eq!(counters.created, 1);
        assert_eq!(counters.updated, 1);
        assert_eq!(counters.deleted, 1);
        assert_eq!(repo.row_count(), 2);
    }

    #[test]
    fn test_replace_skips_insert_when_delete_fails() {
        let repo = MockFormDataRepository::with_rows(&[5]);
        repo.fail_deletes();
        let mut importer = importer(&repo, Behavior::Replace);

        let mut src = source(vec![row("5", "old")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(repo.calls(), vec![RepoCall::Delete(names(&["5"]))]);
        assert_eq!(importer.counters().updated, 1);
    }

    #[test]
    fn test_replace_with_only_new_rows_inserts_without_delete() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Replace);

        let mut src = source(vec![row("", "a"), row(" ", "b")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(repo.calls(), vec![RepoCall::Upsert(names(&["a", "b"]))]);
        assert_eq!(importer.counters().created, 2);
    }

    #[test]
    fn test_replace_uses_ids_collected_so_far() {
        let repo = MockFormDataRepository::with_rows(&[5, 7]);
        let mut importer = importer(&repo, Behavior::Replace);

        let mut src = source(vec![row("5", "a"), row("7", "b")], 1);

        importer.import_data(&mut src).unwrap();
        assert_eq!(
            repo.calls(),
            vec![
                RepoCall::Delete(names(&["5"])),
                RepoCall::Upsert(names(&["a"])),
                RepoCall::Delete(names(&["5", "7"])),
                RepoCall::Upsert(names(&["b"])),
            ]
        );
    }

    #[test]
    fn test_atomic_replace_uses_single_transaction() {
        let repo = MockFormDataRepository::with_rows(&[5]);
        let config = ImportConfig {
            atomic_replace: true,
            ..ImportConfig::with_behavior(Behavior::Replace)
        };
        let mut importer = FormDataImporterImpl::new(repo.clone(), config);

        let mut src = source(vec![row("5", "old"), row("", "new")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(repo.calls(), vec![RepoCall::Replace(names(&["5"]), 2)]);
        assert_eq!(importer.counters().deleted, 1);
    }

    #[test]
    fn test_append_never_deletes() {
        let repo = MockFormDataRepository::with_rows(&[5]);
        let mut importer = importer(&repo, Behavior::Append);

        let mut src = source(vec![row("5", "a"), row("", "b"), row("5", "c")], 2);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(
            repo.calls(),
            vec![
                RepoCall::Upsert(names(&["a", "b"])),
                RepoCall::Upsert(names(&["c"])),
            ]
        );
        assert_eq!(importer.counters().updated, 2);
        assert_eq!(importer.counters().created, 1);
    }

    #[test]
    fn test_append_write_failure_marks_rows_and_keeps_scanning() {
        let repo = MockFormDataRepository::default();
        repo.fail_upserts();
        let mut importer = importer(&repo, Behavior::Append);

        let mut src = source(vec![row("", "a"), row("", "b")], 1);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(repo.calls().len(), 2);

        let summary = importer.summary();
        assert_eq!(summary.counters, ImportCounters::default());
        assert_eq!(summary.report.by_code[ROW_NOT_SAVED], vec![1, 2]);
        assert_eq!(summary.invalid_rows, 2);
    }

    #[test]
    fn test_rejected_id_does_not_stop_later_bunches() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut src = source(
            vec![row("abc", "Jo"), row("", "Al"), row("", "Mo"), row("", "Zed")],
            1,
        );

        assert!(importer.import_data(&mut src).unwrap());

        let summary = importer.summary();
        assert_eq!(summary.processed_rows, 4);
        assert_eq!(summary.counters.created, 3);
        assert_eq!(summary.counters.updated, 0);
        assert_eq!(summary.report.codes_for_row(1), [ROW_NOT_SAVED]);
        assert_eq!(repo.row_count(), 3);
    }

    #[test]
    fn test_atomic_replace_failure_rolls_back_bunch_and_continues() {
        let repo = MockFormDataRepository::with_rows(&[5]);
        let config = ImportConfig {
            atomic_replace: true,
            validation_strategy: ValidationStrategy::SkipErrors,
            ..ImportConfig::with_behavior(Behavior::Replace)
        };
        let mut importer = FormDataImporterImpl::new(repo.clone(), config);

        let mut src = source(vec![row("5", "a"), row("abc", "b"), row("", "c")], 2);

        assert!(importer.import_data(&mut src).unwrap());
        assert_eq!(
            repo.calls(),
            vec![
                RepoCall::Replace(names(&["5", "abc"]), 2),
                RepoCall::Replace(names(&["5", "abc"]), 1),
            ]
        );

        let summary = importer.summary();
        assert_eq!(summary.report.by_code[ROW_NOT_SAVED], vec![1, 2]);
        assert_eq!(summary.counters.updated, 0);
        assert_eq!(summary.counters.created, 1);
        assert_eq!(summary.counters.deleted, 1);
        assert!(!repo.has_row(5));
        assert_eq!(repo.row_count(), 1);
    }

    #[test]
    fn test_append_does_not_collect_replace_ids() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut src = source(vec![row("1", "a"), row("2", "b")], 1);

        importer.import_data(&mut src).unwrap();
        assert!(importer.replace_ids.is_empty());
    }

    #[test]
    fn test_unknown_behavior_is_silent_success() {
        let repo = MockFormDataRepository::default();
        let config = ImportConfig {
            behavior: "add_update".to_string(),
            ..ImportConfig::default()
        };
        let mut importer = FormDataImporterImpl::new(repo.clone(), config);

        let mut src = source(vec![row("", "a")], 10);

        assert!(importer.import_data(&mut src).unwrap());
        assert!(repo.calls().is_empty());
        assert_eq!(importer.summary().behavior, "add_update");
    }

    #[test]
    fn test_termination_marks_rows_to_skip_but_keeps_scanning() {
        let repo = MockFormDataRepository::default();
        let config = ImportConfig {
            validation_strategy: ValidationStrategy::StopOnErrors,
            allowed_error_count: 1,
            ..ImportConfig::with_behavior(Behavior::Append)
        };
        let mut importer = FormDataImporterImpl::new(repo.clone(), config);

        let mut first_bad = row("", "a");
        first_bad[7] = String::new();
        let mut last_bad = row("", "d");
        last_bad[8] = String::new();
        let mut src = source(vec![first_bad, row("", "b"), row("", "c"), last_bad], 2);

        assert!(importer.import_data(&mut src).unwrap());

        let errors = importer.error_aggregator();
        assert!(errors.is_row_skipped(2));
        assert!(errors.is_row_skipped(3));
        assert_eq!(errors.errors_by_row(4).len(), 1);
        assert_eq!(importer.counters().created, 0);
        assert!(repo.calls().is_empty());
        assert_eq!(importer.summary().processed_rows, 4);
    }

    #[test]
    fn test_counters_match_written_rows() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut bad = row("", "x");
        bad[1] = String::new();
        let mut src = source(
            vec![row("1", "a"), row("", "b"), bad, row("2", "c"), row("", "d")],
            2,
        );

        importer.import_data(&mut src).unwrap();

        let counters = importer.counters();
        let written: usize = repo
            .calls()
            .iter()
            .map(|c| match c {
                RepoCall::Upsert(rows) => rows.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(counters.created + counters.updated, written);
        assert_eq!(written, 4);
    }

    #[test]
    fn test_validate_then_import_does_not_duplicate_errors() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut bad = row("", "a");
        bad[9] = String::new();
        bad[10] = String::new();
        let mut src = source(vec![bad, row("", "b")], 10);

        let validation = importer.validate_data(&mut src).unwrap();
        assert_eq!(validation.processed_rows, 2);
        assert_eq!(validation.errors_count, 2);
        assert_eq!(validation.invalid_rows, 1);
        assert!(!validation.is_valid());

        importer.import_data(&mut src).unwrap();
        let summary = importer.summary();
        assert_eq!(summary.report.errors_count, 2);
        assert_eq!(summary.counters.created, 1);
    }

    #[test]
    fn test_validation_trips_termination_for_later_rows() {
        let repo = MockFormDataRepository::default();
        let config = ImportConfig {
            validation_strategy: ValidationStrategy::StopOnErrors,
            allowed_error_count: 1,
            ..ImportConfig::with_behavior(Behavior::Append)
        };
        let mut importer = FormDataImporterImpl::new(repo.clone(), config);

        let mut bad = row("", "a");
        bad[2] = String::new();
        let mut src = source(vec![bad, row("", "b")], 10);

        let validation = importer.validate_data(&mut src).unwrap();
        assert!(validation.terminated);
        assert_eq!(validation.report.skipped_rows, vec![2]);
    }

    #[test]
    fn test_invalid_header_is_rejected_before_reading_rows() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut src = MemoryBunchReader::from_rows(&["first_name", "phone"], &[vec!["Jo", "1"]], 10);

        let result = importer.import_data(&mut src);
        assert!(matches!(result, Err(ImportError::InvalidColumns { .. })));
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_validate_row_is_idempotent() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let record: RawRecord = [("first_name", "Jo")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert!(!importer.validate_row(&record, 1));
        assert!(!importer.validate_row(&record, 1));
        assert_eq!(importer.error_aggregator().errors_count(), 9);
    }

    #[test]
    fn test_reset_clears_run_state() {
        let repo = MockFormDataRepository::default();
        let mut importer = importer(&repo, Behavior::Append);

        let mut bad = row("", "a");
        bad[3] = String::new();
        let mut src = source(vec![bad, row("", "b")], 10);
        importer.import_data(&mut src).unwrap();

        importer.reset();

        let summary = importer.summary();
        assert_eq!(summary.counters, ImportCounters::default());
        assert!(summary.report.is_empty());
        assert_eq!(summary.processed_rows, 0);
        assert_eq!(importer.entity_type_code(), "formdata");
        assert_eq!(importer.valid_column_names().len(), 11);
    }
}
