// ==========================================
// 表单数据导入器 - 导入历史数据仓储
// ==========================================
// 职责: 每次导入运行写入一条 import_history 记录
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::import::{ImportHistory, ImportStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ==========================================
// ImportHistoryRepository - 导入历史仓储
// ==========================================
pub struct ImportHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportHistoryRepository {
    /// 创建新的导入历史仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入导入历史
    ///
    /// # 返回
    /// - `Ok(history_id)`
    pub fn insert(&self, history: &ImportHistory) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_history (
                history_id, entity_code, behavior, file_name, started_at, finished_at,
                created_count, updated_count, deleted_count, invalid_rows,
                error_report_json, config_snapshot_json, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                history.history_id,
                history.entity_code,
                history.behavior,
                history.file_name,
                history.started_at.to_rfc3339(),
                history.finished_at.map(|t| t.to_rfc3339()),
                history.created_count as i64,
                history.updated_count as i64,
                history.deleted_count as i64,
                history.invalid_rows as i64,
                history.error_report_json,
                history.config_snapshot_json,
                history.status.to_string(),
            ],
        )?;

        Ok(history.history_id.clone())
    }

    /// 查询最近的导入历史
    ///
    /// # 参数
    /// - limit: 返回记录数限制
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportHistory>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT history_id, entity_code, behavior, file_name, started_at, finished_at,
                   created_count, updated_count, deleted_count, invalid_rows,
                   error_report_json, config_snapshot_json, status
            FROM import_history
            ORDER BY started_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let started_at: String = row.get(4)?;
                let finished_at: Option<String> = row.get(5)?;
                let status: String = row.get(12)?;
                Ok(ImportHistory {
                    history_id: row.get(0)?,
                    entity_code: row.get(1)?,
                    behavior: row.get(2)?,
                    file_name: row.get(3)?,
                    started_at: parse_ts(&started_at),
                    finished_at: finished_at.as_deref().map(parse_ts),
                    created_count: row.get::<_, i64>(6)? as usize,
                    updated_count: row.get::<_, i64>(7)? as usize,
                    deleted_count: row.get::<_, i64>(8)? as usize,
                    invalid_rows: row.get::<_, i64>(9)? as usize,
                    error_report_json: row.get(10)?,
                    config_snapshot_json: row.get(11)?,
                    status: ImportStatus::from_db(&status),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
