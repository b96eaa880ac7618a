use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::resource::{Resource, SqlParam};

/// A rendered image owned by the user who rendered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: i64,
    pub user_id: i64,
    pub template_id: Option<i64>,
    pub url: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AssetDraft {
    pub user_id: i64,
    pub template_id: Option<i64>,
    pub url: String,
    pub width: i64,
    pub height: i64,
}

/// Assets are immutable once rendered
#[derive(Debug, Clone, Default)]
pub struct AssetPatch;

impl Resource for Asset {
    const KIND: &'static str = "asset";
    const TABLE: &'static str = "assets";
    const HAS_UPDATED_AT: bool = false;

    type Draft = AssetDraft;
    type Patch = AssetPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner(&self) -> Option<i64> {
        Some(self.user_id)
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "user_id" => Some(self.user_id.into()),
            "template_id" => self.template_id.map(Value::from),
            "url" => Some(self.url.clone().into()),
            "width" => Some(self.width.into()),
            "height" => Some(self.height.into()),
            _ => None,
        }
    }

    fn from_draft(id: i64, now: DateTime<Utc>, draft: AssetDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            template_id: draft.template_id,
            url: draft.url,
            width: draft.width,
            height: draft.height,
            created_at: now,
        }
    }

    fn apply(&mut self, _patch: AssetPatch, _now: DateTime<Utc>) {}

    fn insert_params(draft: &AssetDraft) -> Vec<(&'static str, SqlParam)> {
        vec![
            ("user_id", SqlParam::Int(Some(draft.user_id))),
            ("template_id", SqlParam::Int(draft.template_id)),
            ("url", SqlParam::Text(Some(draft.url.clone()))),
            ("width", SqlParam::Int(Some(draft.width))),
            ("height", SqlParam::Int(Some(draft.height))),
        ]
    }

    fn update_params(_patch: &AssetPatch) -> Vec<(&'static str, SqlParam)> {
        vec![]
    }
}
