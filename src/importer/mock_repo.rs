// ==========================================
// 测试用 form_data 仓储（内存实现，记录调用）
// ==========================================

use crate::domain::form_data::FormDataEntity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::form_data_repo::FormDataRepository;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 仓储调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Delete(Vec<String>),          // 去重后的 id
    Upsert(Vec<String>),          // 载荷 first_name（按写入顺序）
    Replace(Vec<String>, usize),  // (id, 载荷数)
}

#[derive(Default)]
struct MockState {
    calls: Vec<RepoCall>,
    rows: BTreeMap<i64, FormDataEntity>,
    next_id: i64,
    fail_deletes: bool,
    fail_upserts: bool,
}

#[derive(Clone, Default)]
pub struct MockFormDataRepository {
    state: Arc<Mutex<MockState>>,
}

impl MockFormDataRepository {
    /// 预置已存在的 id
    pub fn with_rows(ids: &[i64]) -> Self {
        let repo = Self::default();
        {
            let mut state = repo.state.lock().unwrap();
            for &id in ids {
                let mut entity = blank_entity();
                entity.id = Some(id.to_string());
                state.rows.insert(id, entity);
                state.next_id = state.next_id.max(id);
            }
        }
        repo
    }

    pub fn fail_deletes(&self) {
        self.state.lock().unwrap().fail_deletes = true;
    }

    pub fn fail_upserts(&self) {
        self.state.lock().unwrap().fail_upserts = true;
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn has_row(&self, id: i64) -> bool {
        self.state.lock().unwrap().rows.contains_key(&id)
    }
}

fn blank_entity() -> FormDataEntity {
    FormDataEntity {
        id: None,
        first_name: String::new(),
        last_name: String::new(),
        gender: String::new(),
        email: String::new(),
        adress1: String::new(),
        adress2: String::new(),
        city: String::new(),
        state: String::new(),
        zip_code: String::new(),
        feedback: String::new(),
    }
}

impl MockState {
    fn delete(&mut self, ids: &[String]) -> usize {
        ids.iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .filter(|id| self.rows.remove(id).is_some())
            .count()
    }

    fn upsert(&mut self, entities: &[FormDataEntity]) -> RepositoryResult<usize> {
        for entity in entities {
            let id = match &entity.id {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| RepositoryError::DatatypeMismatch(raw.clone()))?,
                None => self.next_id + 1,
            };
            self.next_id = self.next_id.max(id);
            let mut stored = entity.clone();
            stored.id = Some(id.to_string());
            self.rows.insert(id, stored);
        }
        Ok(entities.len())
    }
}

impl FormDataRepository for MockFormDataRepository {
    fn delete_by_ids(&self, ids: &[String]) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepoCall::Delete(ids.to_vec()));
        if state.fail_deletes {
            return Err(RepositoryError::DatabaseQueryError("delete failed".to_string()));
        }
        Ok(state.delete(ids))
    }

    fn upsert_batch(&self, entities: &[FormDataEntity]) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepoCall::Upsert(
            entities.iter().map(|e| e.first_name.clone()).collect(),
        ));
        if state.fail_upserts {
            return Err(RepositoryError::DatabaseQueryError("upsert failed".to_string()));
        }
        state.upsert(entities)
    }

    fn replace_batch(
        &self,
        ids: &[String],
        entities: &[FormDataEntity],
    ) -> RepositoryResult<(usize, usize)> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepoCall::Replace(ids.to_vec(), entities.len()));
        if state.fail_deletes || state.fail_upserts {
            return Err(RepositoryError::DatabaseTransactionError("replace failed".to_string()));
        }

        let snapshot = (state.rows.clone(), state.next_id);
        let deleted = state.delete(ids);
        match state.upsert(entities) {
            Ok(written) => Ok((deleted, written)),
            Err(e) => {
                state.rows = snapshot.0;
                state.next_id = snapshot.1;
                Err(e)
            }
        }
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<FormDataEntity>> {
        let state = self.state.lock().unwrap();
        Ok(id
            .parse::<i64>()
            .ok()
            .and_then(|id| state.rows.get(&id).cloned()))
    }

    fn list_all(&self) -> RepositoryResult<Vec<FormDataEntity>> {
        Ok(self.state.lock().unwrap().rows.values().cloned().collect())
    }

    fn count(&self) -> RepositoryResult<usize> {
        Ok(self.row_count())
    }
}
