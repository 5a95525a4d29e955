// ==========================================
// 表单数据导入器 - form_data Repository Trait
// ==========================================
// 职责: 定义目标表数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::form_data::FormDataEntity;
use crate::repository::error::RepositoryResult;

// ==========================================
// FormDataRepository Trait
// ==========================================
// 用途: 导入写入端（EntityWriter）依赖的存储接口
// 实现者: FormDataRepositoryImpl（使用 rusqlite）
pub trait FormDataRepository {
    /// 按 id 批量删除（单事务）
    ///
    /// # 参数
    /// - ids: 已去重的 id 列表（调用方保证非空）
    ///
    /// # 返回
    /// - Ok(usize): 实际删除的行数
    /// - Err: 数据库错误（事务回滚）
    fn delete_by_ids(&self, ids: &[String]) -> RepositoryResult<usize>;

    /// 批量写入（INSERT ... ON CONFLICT(id) DO UPDATE，单事务）
    ///
    /// # 参数
    /// - entities: 扁平载荷列表；id 为 None 的载荷由数据库分配新 id
    ///
    /// # 返回
    /// - Ok(usize): 写入的载荷数
    /// - Err: 数据库错误（事务回滚）
    fn upsert_batch(&self, entities: &[FormDataEntity]) -> RepositoryResult<usize>;

    /// 在同一事务中先删后写
    ///
    /// # 返回
    /// - Ok((deleted, written))
    /// - Err: 任一步失败，整体回滚
    fn replace_batch(
        &self,
        ids: &[String],
        entities: &[FormDataEntity],
    ) -> RepositoryResult<(usize, usize)>;

    /// 按 id 查询
    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<FormDataEntity>>;

    /// 查询全部（按 id 升序）
    fn list_all(&self) -> RepositoryResult<Vec<FormDataEntity>>;

    /// 统计记录数
    fn count(&self) -> RepositoryResult<usize>;
}
