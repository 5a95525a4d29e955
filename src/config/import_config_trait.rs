// ==========================================
// 表单数据导入器 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::domain::types::ValidationStrategy;
use crate::repository::error::RepositoryResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 获取导入行为代码
    ///
    /// # 默认值
    /// - append
    fn get_behavior(&self) -> RepositoryResult<String>;

    /// 获取校验策略
    ///
    /// # 默认值
    /// - validation-stop-on-errors
    fn get_validation_strategy(&self) -> RepositoryResult<ValidationStrategy>;

    /// 获取允许的错误数（达到后触发终止条件）
    ///
    /// # 默认值
    /// - 10
    fn get_allowed_error_count(&self) -> RepositoryResult<usize>;

    /// 获取每个 bunch 的行数
    ///
    /// # 默认值
    /// - 100
    fn get_bunch_size(&self) -> RepositoryResult<usize>;

    /// 获取 CSV 分隔符
    ///
    /// # 默认值
    /// - ','
    fn get_field_separator(&self) -> RepositoryResult<u8>;

    /// Replace 时是否单事务执行“删 + 写”
    ///
    /// # 默认值
    /// - false
    fn get_atomic_replace(&self) -> RepositoryResult<bool>;

    /// 汇总为 ImportConfig
    fn load_import_config(&self) -> RepositoryResult<ImportConfig> {
        Ok(ImportConfig {
            behavior: self.get_behavior()?,
            validation_strategy: self.get_validation_strategy()?,
            allowed_error_count: self.get_allowed_error_count()?,
            bunch_size: self.get_bunch_size()?,
            field_separator: self.get_field_separator()?,
            atomic_replace: self.get_atomic_replace()?,
        })
    }
}
