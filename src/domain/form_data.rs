// ==========================================
// 表单数据导入器 - 表单数据实体
// ==========================================
// 职责: 行记录（读入）、写入载荷、批内实体分组
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::types::FormDataColumn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// FormDataRow - 源文件中的一行
// ==========================================
// 每个字段对应固定 schema 中的一列；列缺失时为 None
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDataRow {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub adress1: Option<String>,
    pub adress2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub feedback: Option<String>,
}

impl FormDataRow {
    /// 从原始记录（列名 → 值）构建；不在 schema 中的列被忽略
    pub fn from_record(record: &HashMap<String, String>) -> Self {
        let get = |column: FormDataColumn| record.get(column.as_str()).cloned();

        Self {
            id: get(FormDataColumn::Id),
            first_name: get(FormDataColumn::FirstName),
            last_name: get(FormDataColumn::LastName),
            gender: get(FormDataColumn::Gender),
            email: get(FormDataColumn::Email),
            adress1: get(FormDataColumn::Adress1),
            adress2: get(FormDataColumn::Adress2),
            city: get(FormDataColumn::City),
            state: get(FormDataColumn::State),
            zip_code: get(FormDataColumn::ZipCode),
            feedback: get(FormDataColumn::Feedback),
        }
    }

    fn field(&self, column: FormDataColumn) -> Option<&String> {
        match column {
            FormDataColumn::Id => self.id.as_ref(),
            FormDataColumn::FirstName => self.first_name.as_ref(),
            FormDataColumn::LastName => self.last_name.as_ref(),
            FormDataColumn::Gender => self.gender.as_ref(),
            FormDataColumn::Email => self.email.as_ref(),
            FormDataColumn::Adress1 => self.adress1.as_ref(),
            FormDataColumn::Adress2 => self.adress2.as_ref(),
            FormDataColumn::City => self.city.as_ref(),
            FormDataColumn::State => self.state.as_ref(),
            FormDataColumn::ZipCode => self.zip_code.as_ref(),
            FormDataColumn::Feedback => self.feedback.as_ref(),
        }
    }

    /// 读取列值，列缺失时返回空字符串
    pub fn get(&self, column: FormDataColumn) -> &str {
        self.field(column).map(String::as_str).unwrap_or("")
    }

    /// 列值是否为空（缺失 / 空串 / 纯空白）
    pub fn is_blank(&self, column: FormDataColumn) -> bool {
        self.get(column).trim().is_empty()
    }

    /// 实体 id（缺失或空白视为不存在 → 新建）
    pub fn entity_id(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 按 schema 列组装写入载荷
    pub fn to_entity(&self) -> FormDataEntity {
        FormDataEntity {
            id: self.entity_id(),
            first_name: self.get(FormDataColumn::FirstName).to_string(),
            last_name: self.get(FormDataColumn::LastName).to_string(),
            gender: self.get(FormDataColumn::Gender).to_string(),
            email: self.get(FormDataColumn::Email).to_string(),
            adress1: self.get(FormDataColumn::Adress1).to_string(),
            adress2: self.get(FormDataColumn::Adress2).to_string(),
            city: self.get(FormDataColumn::City).to_string(),
            state: self.get(FormDataColumn::State).to_string(),
            zip_code: self.get(FormDataColumn::ZipCode).to_string(),
            feedback: self.get(FormDataColumn::Feedback).to_string(),
        }
    }
}

// ==========================================
// FormDataEntity - 写入 form_data 表的载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDataEntity {
    pub id: Option<String>, // None → 由数据库分配
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub email: String,
    pub adress1: String,
    pub adress2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub feedback: String,
}

// ==========================================
// EntityBatch - 单个 bunch 内按 id 分组的载荷
// ==========================================
// 同一 id 在 bunch 内多次出现时全部保留（不合并）
// 展开顺序: 分组首次出现顺序 → 组内追加顺序
#[derive(Debug, Clone, Default)]
pub struct EntityBatch {
    groups: Vec<(Option<String>, Vec<FormDataEntity>)>,
    index: HashMap<Option<String>, usize>,
}

impl EntityBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: FormDataEntity) {
        let key = entity.id.clone();
        match self.index.get(&key) {
            Some(&pos) => self.groups[pos].1.push(entity),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![entity]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 分组数量（不同 id 的个数，“无 id”算一组）
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// 载荷总数
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, rows)| rows.len()).sum()
    }

    /// 某个 id 下的载荷
    pub fn entities_for(&self, id: Option<&str>) -> &[FormDataEntity] {
        let key = id.map(str::to_string);
        self.index
            .get(&key)
            .map(|&pos| self.groups[pos].1.as_slice())
            .unwrap_or(&[])
    }

    /// 展开为扁平载荷列表
    pub fn flatten(self) -> Vec<FormDataEntity> {
        self.groups.into_iter().flat_map(|(_, rows)| rows).collect()
    }
}
