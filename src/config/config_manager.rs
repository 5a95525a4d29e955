// ==========================================
// 表单数据导入器 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config::{
    DEFAULT_ALLOWED_ERROR_COUNT, DEFAULT_BUNCH_SIZE, DEFAULT_FIELD_SEPARATOR,
};
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::{Behavior, ValidationStrategy};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导入历史中记录本次运行使用的配置
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_behavior(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::BEHAVIOR, Behavior::Append.code())?;
        if Behavior::from_code(&value).is_none() {
            // 保留原值：未识别行为由调度器决定如何处理
            warn!(config_key = config_keys::BEHAVIOR, raw_value = %value, "导入行为未识别");
        }
        Ok(value.trim().to_lowercase())
    }

    fn get_validation_strategy(&self) -> RepositoryResult<ValidationStrategy> {
        let value = self.get_config_or_default(
            config_keys::VALIDATION_STRATEGY,
            ValidationStrategy::StopOnErrors.code(),
        )?;
        Ok(ValidationStrategy::from_code(&value).unwrap_or_else(|| {
            warn!(
                config_key = config_keys::VALIDATION_STRATEGY,
                raw_value = %value,
                "校验策略配置格式错误，使用默认值"
            );
            ValidationStrategy::default()
        }))
    }

    fn get_allowed_error_count(&self) -> RepositoryResult<usize> {
        let default = DEFAULT_ALLOWED_ERROR_COUNT.to_string();
        let value = self.get_config_or_default(config_keys::ALLOWED_ERROR_COUNT, &default)?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            warn!(
                config_key = config_keys::ALLOWED_ERROR_COUNT,
                raw_value = %value,
                "允许错误数配置格式错误，使用默认值"
            );
            DEFAULT_ALLOWED_ERROR_COUNT
        }))
    }

    fn get_bunch_size(&self) -> RepositoryResult<usize> {
        let default = DEFAULT_BUNCH_SIZE.to_string();
        let value = self.get_config_or_default(config_keys::BUNCH_SIZE, &default)?;
        Ok(value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&v| v > 0)
            .unwrap_or_else(|| {
                warn!(
                    config_key = config_keys::BUNCH_SIZE,
                    raw_value = %value,
                    "bunch 大小配置格式错误，使用默认值"
                );
                DEFAULT_BUNCH_SIZE
            }))
    }

    fn get_field_separator(&self) -> RepositoryResult<u8> {
        let value = self.get_config_or_default(config_keys::FIELD_SEPARATOR, ",")?;
        // 仅接受单字节 ASCII 分隔符；制表符可写作 "\t"
        let separator = match value.as_str() {
            "\\t" | "\t" => Some(b'\t'),
            v if v.len() == 1 && v.is_ascii() => v.bytes().next(),
            _ => None,
        };
        Ok(separator.unwrap_or_else(|| {
            warn!(
                config_key = config_keys::FIELD_SEPARATOR,
                raw_value = %value,
                "分隔符配置格式错误，使用默认值"
            );
            DEFAULT_FIELD_SEPARATOR
        }))
    }

    fn get_atomic_replace(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::ATOMIC_REPLACE, "0")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes"
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入行为
    pub const BEHAVIOR: &str = "import_behavior";

    // 错误处理
    pub const VALIDATION_STRATEGY: &str = "import_validation_strategy";
    pub const ALLOWED_ERROR_COUNT: &str = "import_allowed_error_count";

    // 读取
    pub const BUNCH_SIZE: &str = "import_bunch_size";
    pub const FIELD_SEPARATOR: &str = "import_field_separator";

    // 写入
    pub const ATOMIC_REPLACE: &str = "import_atomic_replace";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::db::init_schema;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let manager = setup_manager();
        assert_eq!(manager.load_import_config().unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let manager = setup_manager();
        manager.set_global_config_value(config_keys::BEHAVIOR, "Replace").unwrap();
        manager
            .set_global_config_value(config_keys::VALIDATION_STRATEGY, "validation-skip-errors")
            .unwrap();
        manager.set_global_config_value(config_keys::ALLOWED_ERROR_COUNT, "3").unwrap();
        manager.set_global_config_value(config_keys::BUNCH_SIZE, "2").unwrap();
        manager.set_global_config_value(config_keys::FIELD_SEPARATOR, ";").unwrap();
        manager.set_global_config_value(config_keys::ATOMIC_REPLACE, "true").unwrap();

        let config = manager.load_import_config().unwrap();
        assert_eq!(config.behavior, "replace");
        assert_eq!(config.validation_strategy, ValidationStrategy::SkipErrors);
        assert_eq!(config.allowed_error_count, 3);
        assert_eq!(config.bunch_size, 2);
        assert_eq!(config.field_separator, b';');
        assert!(config.atomic_replace);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let manager = setup_manager();
        manager.set_global_config_value(config_keys::BUNCH_SIZE, "0").unwrap();
        manager.set_global_config_value(config_keys::ALLOWED_ERROR_COUNT, "many").unwrap();
        manager.set_global_config_value(config_keys::FIELD_SEPARATOR, ";;").unwrap();

        assert_eq!(manager.get_bunch_size().unwrap(), DEFAULT_BUNCH_SIZE);
        assert_eq!(manager.get_allowed_error_count().unwrap(), DEFAULT_ALLOWED_ERROR_COUNT);
        assert_eq!(manager.get_field_separator().unwrap(), b',');
    }

    #[test]
    fn test_unknown_behavior_is_kept() {
        let manager = setup_manager();
        manager.set_global_config_value(config_keys::BEHAVIOR, "add_update").unwrap();
        assert_eq!(manager.get_behavior().unwrap(), "add_update");
    }

    #[test]
    fn test_snapshot_contains_overrides() {
        let manager = setup_manager();
        manager.set_global_config_value(config_keys::BUNCH_SIZE, "50").unwrap();
        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("import_bunch_size"));
        assert!(snapshot.contains("50"));
    }
}
