use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::resource::{Resource, SqlParam};

/// A design template. Templates without an owner are global and read-only
/// for everyone except administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub config: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TemplateDraft {
    pub user_id: Option<i64>,
    pub name: String,
    pub config: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub config: Option<Value>,
}

impl Resource for Template {
    const KIND: &'static str = "template";
    const TABLE: &'static str = "templates";

    type Draft = TemplateDraft;
    type Patch = TemplatePatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner(&self) -> Option<i64> {
        self.user_id
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "user_id" => self.user_id.map(Value::from),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }

    fn from_draft(id: i64, now: DateTime<Utc>, draft: TemplateDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            config: draft.config,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: TemplatePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(config) = patch.config {
            self.config = config;
        }
        self.updated_at = now;
    }

    fn insert_params(draft: &TemplateDraft) -> Vec<(&'static str, SqlParam)> {
        vec![
            ("user_id", SqlParam::Int(draft.user_id)),
            ("name", SqlParam::Text(Some(draft.name.clone()))),
            ("config", SqlParam::Json(draft.config.clone())),
        ]
    }

    fn update_params(patch: &TemplatePatch) -> Vec<(&'static str, SqlParam)> {
        let mut params = Vec::new();
        if let Some(name) = &patch.name {
            params.push(("name", SqlParam::Text(Some(name.clone()))));
        }
        if let Some(config) = &patch.config {
            params.push(("config", SqlParam::Json(config.clone())));
        }
        params
    }
}
