// ==========================================
// 表单数据导入API
// ==========================================
// 职责: 配置加载 → 打开数据源 → 校验 → 导入 → 写入导入历史
// 说明: 校验触发终止条件时不落库，历史状态记为 INVALID
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfig, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::import::{
    ImportHistory, ImportStatus, ImportSummary, ValidationSummary,
};
use crate::domain::types::Behavior;
use crate::i18n;
use crate::importer::{open_bunch_reader, FormDataImporter, FormDataImporterImpl, ENTITY_CODE};
use crate::repository::{FormDataRepositoryImpl, ImportHistoryRepository};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入历史ID
    pub history_id: String,
    /// 运行状态
    pub status: ImportStatus,
    /// 分发结果（Delete 行为下: 删除调用是否执行）
    pub success: bool,
    /// 结果说明
    pub message: String,
    /// 运行汇总（计数器 + 错误报告）
    pub summary: ImportSummary,
    /// 校验汇总
    pub validation: ValidationSummary,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 导入API
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
}

impl ImportApi {
    /// 创建新的ImportApi实例（初始化 schema）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责 schema 初始化）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn config_manager(&self) -> ApiResult<ConfigManager> {
        Ok(ConfigManager::from_connection(self.conn.clone())?)
    }

    /// 读取导入配置，可选覆盖行为代码
    pub fn load_config(&self, behavior_override: Option<&str>) -> ApiResult<ImportConfig> {
        let mut config = self.config_manager()?.load_import_config()?;
        if let Some(behavior) = behavior_override {
            config.behavior = behavior.trim().to_lowercase();
        }
        Ok(config)
    }

    /// 导入文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv/.xlsx/.xls）
    /// - behavior_override: 行为代码（None 时使用 config_kv 中的配置）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果（含 INVALID 状态）
    /// - Err(ApiError): 文件/表头/写入错误（已写入 FAILED 历史）
    pub fn import_file(
        &self,
        file_path: &Path,
        behavior_override: Option<&str>,
    ) -> ApiResult<ImportApiResponse> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let config = self.load_config(behavior_override)?;
        let behavior = config.behavior.clone();
        let config_snapshot = self.config_snapshot();

        info!(file = %file_path.display(), behavior = %behavior, "开始导入");

        let mut importer = FormDataImporterImpl::new(
            FormDataRepositoryImpl::from_connection(self.conn.clone()),
            config.clone(),
        );

        let outcome = open_bunch_reader(file_path, &config).and_then(|mut source| {
            let validation = importer.validate_data(source.as_mut())?;
            if validation.terminated {
                return Ok((validation, None));
            }
            let success = importer.import_data(source.as_mut())?;
            Ok((validation, Some(success)))
        });

        let summary = importer.summary();
        let (status, validation, success) = match outcome {
            Ok((validation, Some(success))) => (ImportStatus::Success, validation, success),
            Ok((validation, None)) => (ImportStatus::Invalid, validation, false),
            Err(e) => {
                error!(file = %file_path.display(), error = %e, "导入失败");
                let history = self.build_history(
                    &summary,
                    file_path,
                    started_at,
                    ImportStatus::Failed,
                    config_snapshot,
                );
                if let Err(history_err) = self.record_history(&history) {
                    warn!(error = %history_err, "写入导入历史失败");
                }
                return Err(e.into());
            }
        };

        let history = self.build_history(&summary, file_path, started_at, status, config_snapshot);
        let history_id = self.record_history(&history)?;

        let message = match (status, config.parsed_behavior()) {
            (ImportStatus::Success, None) => {
                i18n::t_with_args("import.unknown_behavior", &[("behavior", behavior.as_str())])
            }
            (ImportStatus::Success, Some(_)) => i18n::t("common.success"),
            _ => i18n::t("common.failed"),
        };

        info!(
            history_id = %history_id,
            status = %status,
            created = summary.counters.created,
            updated = summary.counters.updated,
            deleted = summary.counters.deleted,
            invalid_rows = summary.invalid_rows,
            "导入结束"
        );

        Ok(ImportApiResponse {
            history_id,
            status,
            success,
            message,
            summary,
            validation,
            elapsed_ms: timer.elapsed().as_millis() as i64,
        })
    }

    /// 仅校验文件（不落库，不写历史）
    pub fn validate_file(&self, file_path: &Path) -> ApiResult<ValidationSummary> {
        let config = self.load_config(None)?;
        let mut source = open_bunch_reader(file_path, &config)?;

        let mut importer = FormDataImporterImpl::new(
            FormDataRepositoryImpl::from_connection(self.conn.clone()),
            config,
        );
        Ok(importer.validate_data(source.as_mut())?)
    }

    /// 查询最近的导入历史
    pub fn list_history(&self, limit: usize) -> ApiResult<Vec<ImportHistory>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        let repo = ImportHistoryRepository::new(self.conn.clone());
        Ok(repo.list_recent(limit.min(1000))?)
    }

    /// config_kv 快照（读取失败时不阻断导入）
    fn config_snapshot(&self) -> Option<String> {
        match self
            .config_manager()
            .and_then(|manager| Ok(manager.get_config_snapshot()?))
        {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "读取配置快照失败");
                None
            }
        }
    }

    fn build_history(
        &self,
        summary: &ImportSummary,
        file_path: &Path,
        started_at: chrono::DateTime<Utc>,
        status: ImportStatus,
        config_snapshot_json: Option<String>,
    ) -> ImportHistory {
        let error_report_json = if summary.report.is_empty() {
            None
        } else {
            match serde_json::to_string(&summary.report) {
                Ok(json) => Some(json),
                Err(e) => {
                    warn!(error = %e, "错误报告序列化失败");
                    None
                }
            }
        };

        ImportHistory {
            history_id: Uuid::new_v4().to_string(),
            entity_code: ENTITY_CODE.to_string(),
            behavior: summary.behavior.clone(),
            file_name: file_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string()),
            started_at,
            finished_at: Some(Utc::now()),
            created_count: summary.counters.created,
            updated_count: summary.counters.updated,
            deleted_count: summary.counters.deleted,
            invalid_rows: summary.invalid_rows,
            error_report_json,
            config_snapshot_json,
            status,
        }
    }

    fn record_history(&self, history: &ImportHistory) -> ApiResult<String> {
        let repo = ImportHistoryRepository::new(self.conn.clone());
        Ok(repo.insert(history)?)
    }
}

/// 行为代码是否可识别（供调用方做前置提示）
pub fn is_known_behavior(code: &str) -> bool {
    Behavior::from_code(code).is_some()
}
