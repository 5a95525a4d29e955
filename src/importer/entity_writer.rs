// ==========================================
// 表单数据导入器 - 实体写入器
// ==========================================
// 职责:
//   - 按 id 去重删除（删除失败不抛出，转为 WriteError::Store 交给调用方判断）
//   - 按 id 分组载荷的批量写入（id 冲突时覆盖）
//   - Replace 原子模式: 删 + 写同一事务
// ==========================================

use crate::domain::form_data::EntityBatch;
use crate::domain::import::ImportCounters;
use crate::repository::error::RepositoryError;
use crate::repository::form_data_repo::FormDataRepository;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// 写入结果类型
#[derive(Error, Debug)]
pub enum WriteError {
    /// id 列表为空，未发起删除
    #[error("没有需要删除的 id")]
    NothingToDelete,

    /// 存储层失败（事务已回滚）
    #[error("存储写入失败: {0}")]
    Store(#[from] RepositoryError),
}

/// id 去重（保留首次出现顺序）
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

pub struct EntityWriter<R>
where
    R: FormDataRepository,
{
    repo: R,
}

impl<R> EntityWriter<R>
where
    R: FormDataRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 按 id 删除
    ///
    /// # 返回
    /// - Ok(affected): 删除已执行，deleted 计数器累加实际影响行数
    /// - Err(NothingToDelete): id 列表为空，未调用存储
    /// - Err(Store): 存储失败（已记录 warn，不向上抛出）
    pub fn delete_by_ids(
        &self,
        ids: &[String],
        counters: &mut ImportCounters,
    ) -> Result<usize, WriteError> {
        let unique = dedup_ids(ids);
        if unique.is_empty() {
            return Err(WriteError::NothingToDelete);
        }

        match self.repo.delete_by_ids(&unique) {
            Ok(affected) => {
                counters.add_deleted(affected);
                debug!(ids = unique.len(), affected, "按 id 删除完成");
                Ok(affected)
            }
            Err(e) => {
                warn!(ids = unique.len(), error = %e, "按 id 删除失败，跳过依赖写入");
                Err(WriteError::Store(e))
            }
        }
    }

    /// 批量写入（展开顺序: 分组首次出现顺序 → 组内顺序）
    ///
    /// # 返回
    /// - Ok(false): 空批次，未调用存储
    /// - Ok(true): 写入已提交
    /// - Err(Store): 存储失败
    pub fn upsert_batch(&self, batch: EntityBatch) -> Result<bool, WriteError> {
        if batch.is_empty() {
            return Ok(false);
        }

        let groups = batch.group_count();
        let entities = batch.flatten();
        let written = self.repo.upsert_batch(&entities)?;
        debug!(groups, written, "批量写入完成");
        Ok(true)
    }

    /// 原子替换: 删除与写入在同一事务中执行
    ///
    /// # 返回
    /// - Ok(written): 事务已提交，deleted 计数器累加实际删除行数
    /// - Err(NothingToDelete): id 列表为空，未调用存储（调用方改走普通写入）
    /// - Err(Store): 任一步失败，整体回滚
    pub fn replace(
        &self,
        ids: &[String],
        batch: EntityBatch,
        counters: &mut ImportCounters,
    ) -> Result<usize, WriteError> {
        let unique = dedup_ids(ids);
        if unique.is_empty() {
            return Err(WriteError::NothingToDelete);
        }

        let entities = batch.flatten();
        match self.repo.replace_batch(&unique, &entities) {
            Ok((deleted, written)) => {
                counters.add_deleted(deleted);
                debug!(ids = unique.len(), deleted, written, "原子替换完成");
                Ok(written)
            }
            Err(e) => {
                warn!(ids = unique.len(), error = %e, "原子替换失败，事务已回滚");
                Err(WriteError::Store(e))
            }
        }
    }
}
