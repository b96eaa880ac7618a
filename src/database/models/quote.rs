use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::resource::{Resource, SqlParam};

pub const CATEGORIES: &[&str] = &["motivation", "life", "inspiration", "wisdom", "humor", "general"];
pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub category: String,
    pub created_by: Option<i64>,
    pub likes: i64,
    pub shares: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QuoteDraft {
    pub text: String,
    pub author: String,
    pub category: String,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotePatch {
    pub text: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl Resource for Quote {
    const KIND: &'static str = "quote";
    const TABLE: &'static str = "quotes";
    const COUNTERS: &'static [&'static str] = &["likes", "shares"];

    type Draft = QuoteDraft;
    type Patch = QuotePatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner(&self) -> Option<i64> {
        self.created_by
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "text" => Some(self.text.clone().into()),
            "author" => Some(self.author.clone().into()),
            "category" => Some(self.category.clone().into()),
            "created_by" => self.created_by.map(Value::from),
            "likes" => Some(self.likes.into()),
            "shares" => Some(self.shares.into()),
            _ => None,
        }
    }

    fn from_draft(id: i64, now: DateTime<Utc>, draft: QuoteDraft) -> Self {
        Self {
            id,
            text: draft.text,
            author: draft.author,
            category: draft.category,
            created_by: draft.created_by,
            likes: 0,
            shares: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: QuotePatch, now: DateTime<Utc>) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.updated_at = now;
    }

    fn increment(&mut self, column: &str) -> bool {
        match column {
            "likes" => self.likes += 1,
            "shares" => self.shares += 1,
            _ => return false,
        }
        true
    }

    fn insert_params(draft: &QuoteDraft) -> Vec<(&'static str, SqlParam)> {
        vec![
            ("text", SqlParam::Text(Some(draft.text.clone()))),
            ("author", SqlParam::Text(Some(draft.author.clone()))),
            ("category", SqlParam::Text(Some(draft.category.clone()))),
            ("created_by", SqlParam::Int(draft.created_by)),
        ]
    }

    fn update_params(patch: &QuotePatch) -> Vec<(&'static str, SqlParam)> {
        let mut params = Vec::new();
        if let Some(text) = &patch.text {
            params.push(("text", SqlParam::Text(Some(text.clone()))));
        }
        if let Some(author) = &patch.author {
            params.push(("author", SqlParam::Text(Some(author.clone()))));
        }
        if let Some(category) = &patch.category {
            params.push(("category", SqlParam::Text(Some(category.clone()))));
        }
        params
    }
}
