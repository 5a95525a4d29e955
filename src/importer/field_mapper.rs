// ==========================================
// 表单数据导入器 - 字段映射器
// ==========================================
// 职责:
//   - 表头校验（空列名 / 未识别列 / 缺少常驻列 id）
//   - 原始记录（列名 → 值）→ FormDataRow
// 说明: 必填数据列可以不出现在表头中，由行校验报错
// ==========================================

use crate::domain::form_data::FormDataRow;
use crate::domain::types::FormDataColumn;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::form_data_importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;
use tracing::warn;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn check_columns(&self, headers: &[String]) -> ImportResult<()> {
        check_columns(headers)
    }

    fn map_to_row(&self, record: &HashMap<String, String>) -> FormDataRow {
        FormDataRow::from_record(record)
    }
}

/// 表头校验
///
/// # 返回
/// - Err(InvalidColumns): 汇总全部问题后一次性返回
pub fn check_columns(headers: &[String]) -> ImportResult<()> {
    let mut unknown = Vec::new();
    let mut empty = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        let name = header.trim();
        if name.is_empty() {
            empty.push(idx + 1);
        } else if FormDataColumn::from_name(name).is_none() {
            unknown.push(name.to_string());
        }
    }

    let missing: Vec<String> = FormDataColumn::PERMANENT
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == col.as_str()))
        .map(|col| col.as_str().to_string())
        .collect();

    if unknown.is_empty() && missing.is_empty() && empty.is_empty() {
        return Ok(());
    }

    warn!(?unknown, ?missing, ?empty, "表头校验失败");
    Err(ImportError::InvalidColumns {
        unknown,
        missing,
        empty,
    })
}
