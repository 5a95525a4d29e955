// ==========================================
// 表单数据导入器 - form_data Repository 实现
// ==========================================
// 职责: 实现目标表数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::form_data::FormDataEntity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::form_data_repo::FormDataRepository;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 单条 DELETE 语句的最大绑定参数数量（低于 SQLite 旧版本 999 上限）
const DELETE_CHUNK_SIZE: usize = 500;

const UPSERT_SQL: &str = r#"
    INSERT INTO form_data (
        id, first_name, last_name, gender, email,
        adress1, adress2, city, state, zip_code, feedback
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
    )
    ON CONFLICT(id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        gender = excluded.gender,
        email = excluded.email,
        adress1 = excluded.adress1,
        adress2 = excluded.adress2,
        city = excluded.city,
        state = excluded.state,
        zip_code = excluded.zip_code,
        feedback = excluded.feedback
"#;

const SELECT_COLUMNS: &str = "CAST(id AS TEXT), first_name, last_name, gender, email, \
     adress1, adress2, city, state, zip_code, feedback";

// ==========================================
// FormDataRepositoryImpl
// ==========================================
pub struct FormDataRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl FormDataRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与其他仓储共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中按 id 删除（分块绑定参数）
    fn delete_by_ids_tx(tx: &Transaction, ids: &[String]) -> RepositoryResult<usize> {
        let mut affected = 0;
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("DELETE FROM form_data WHERE id IN ({})", placeholders);
            affected += tx.execute(&sql, params_from_iter(chunk.iter()))?;
        }
        Ok(affected)
    }

    /// 在事务中批量写入
    fn upsert_batch_tx(tx: &Transaction, entities: &[FormDataEntity]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(UPSERT_SQL)?;

        let mut count = 0;
        for entity in entities {
            stmt.execute(params![
                entity.id,
                entity.first_name,
                entity.last_name,
                entity.gender,
                entity.email,
                entity.adress1,
                entity.adress2,
                entity.city,
                entity.state,
                entity.zip_code,
                entity.feedback,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FormDataEntity> {
        Ok(FormDataEntity {
            id: row.get(0)?,
            first_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            last_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            gender: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            email: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            adress1: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            adress2: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            city: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            state: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            zip_code: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            feedback: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        })
    }
}

impl FormDataRepository for FormDataRepositoryImpl {
    /// 按 id 批量删除（事务化）
    fn delete_by_ids(&self, ids: &[String]) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let affected = Self::delete_by_ids_tx(&tx, ids)?;

        tx.commit()?;
        debug!(ids = ids.len(), affected, "form_data 删除完成");
        Ok(affected)
    }

    /// 批量写入（事务化）
    fn upsert_batch(&self, entities: &[FormDataEntity]) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let count = Self::upsert_batch_tx(&tx, entities)?;

        tx.commit()?;
        debug!(count, "form_data 写入完成");
        Ok(count)
    }

    /// 先删后写（同一事务）
    fn replace_batch(
        &self,
        ids: &[String],
        entities: &[FormDataEntity],
    ) -> RepositoryResult<(usize, usize)> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = if ids.is_empty() {
            0
        } else {
            Self::delete_by_ids_tx(&tx, ids)?
        };
        let written = Self::upsert_batch_tx(&tx, entities)?;

        tx.commit()?;
        debug!(deleted, written, "form_data 替换完成");
        Ok((deleted, written))
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<FormDataEntity>> {
        let conn = self.lock()?;

        let sql = format!("SELECT {} FROM form_data WHERE id = ?1", SELECT_COLUMNS);
        let result = conn.query_row(&sql, params![id], Self::map_row);

        match result {
            Ok(entity) => Ok(Some(entity)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self) -> RepositoryResult<Vec<FormDataEntity>> {
        let conn = self.lock()?;

        let sql = format!("SELECT {} FROM form_data ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let entities = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entities)
    }

    fn count(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM form_data", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
