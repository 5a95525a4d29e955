// ==========================================
// 表单数据导入器 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::form_data::FormDataRow;
use crate::domain::import::{ImportSummary, ValidationSummary};
use crate::importer::error::ImportResult;
use std::collections::HashMap;

/// 原始行记录（列名 → 去空白后的值）
pub type RawRecord = HashMap<String, String>;

/// 一批行记录: (行号, 记录)，行号为运行内从 1 开始的数据行序号
pub type Bunch = Vec<(usize, RawRecord)>;

// ==========================================
// FormDataImporter Trait
// ==========================================
// 用途: 表单数据导入主接口
// 实现者: FormDataImporterImpl
pub trait FormDataImporter {
    /// 仅校验（不落库）
    ///
    /// # 流程
    /// 1. 表头校验
    /// 2. 逐批逐行校验，达到终止条件的行标记跳过
    ///
    /// # 返回
    /// - Ok(ValidationSummary): 校验汇总
    /// - Err: 读取错误、表头校验失败
    fn validate_data(&mut self, source: &mut dyn BunchReader) -> ImportResult<ValidationSummary>;

    /// 执行导入（按运行级 behavior 分发）
    ///
    /// # 返回
    /// - Ok(true): 分发成功（Delete 行为下: 删除调用已执行）
    /// - Ok(false): Delete 行为下未收集到任何 id
    /// - Err: 读取错误、表头校验失败、批量写入失败
    fn import_data(&mut self, source: &mut dyn BunchReader) -> ImportResult<bool>;

    /// 本次运行汇总（计数器 + 错误报告）
    fn summary(&self) -> ImportSummary;

    /// 清空计数器、错误与已校验行集合
    fn reset(&mut self);

    /// 实体类型代码
    fn entity_type_code(&self) -> &'static str;
}

// ==========================================
// BunchReader Trait
// ==========================================
// 用途: 惰性、有限、可在运行内重读的批次序列
// 实现者: CsvBunchReader, ExcelBunchReader, MemoryBunchReader
pub trait BunchReader {
    /// 表头（去空白，保持源顺序）
    fn headers(&self) -> &[String];

    /// 回到第一批，行号从 1 重新开始
    fn rewind(&mut self) -> ImportResult<()>;

    /// 读取下一批
    ///
    /// # 返回
    /// - Ok(Some(bunch)): 非空批次
    /// - Ok(None): 已读完
    /// - Err: 读取/解析错误
    fn next_bunch(&mut self) -> ImportResult<Option<Bunch>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头校验 + 原始记录映射
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 表头校验（空列名 / 未识别列 / 缺少常驻列）
    fn check_columns(&self, headers: &[String]) -> ImportResult<()>;

    /// 原始记录 → FormDataRow（未识别列被忽略）
    fn map_to_row(&self, record: &RawRecord) -> FormDataRow;
}
