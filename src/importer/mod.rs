// ==========================================
// 表单数据导入器 - 导入层
// ==========================================
// 职责: 批次读取 → 行校验 → 按行为分发 → 批量写入
// 支持: CSV, Excel, 内存记录
// ==========================================

// 模块声明
pub mod bunch_reader;
pub mod entity_writer;
pub mod error;
pub mod error_aggregator;
pub mod field_mapper;
pub mod form_data_importer_impl;
pub mod form_data_importer_trait;
pub mod row_validator;

#[cfg(test)]
pub(crate) mod mock_repo;

// 重导出核心类型
pub use bunch_reader::{open_bunch_reader, CsvBunchReader, ExcelBunchReader, MemoryBunchReader};
pub use entity_writer::{dedup_ids, EntityWriter, WriteError};
pub use error::{ImportError, ImportResult};
pub use error_aggregator::ErrorAggregator;
pub use field_mapper::{check_columns, FieldMapper as FieldMapperImpl};
pub use form_data_importer_impl::{FormDataImporterImpl, ENTITY_CODE, ROW_NOT_SAVED};
pub use row_validator::RowValidator;

// 重导出 Trait 接口
pub use form_data_importer_trait::{Bunch, BunchReader, FieldMapper, FormDataImporter, RawRecord};
