use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::resource::{Resource, SqlParam};

/// Per-user colours, font and watermark applied to renders. One per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub id: i64,
    pub user_id: i64,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
    pub watermark_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full brand kit body; also used as the replacement patch on upsert
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKitFields {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
    pub watermark_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BrandKitDraft {
    pub user_id: i64,
    pub fields: BrandKitFields,
}

impl Resource for BrandKit {
    const KIND: &'static str = "brand_kit";
    const TABLE: &'static str = "brand_kits";

    type Draft = BrandKitDraft;
    type Patch = BrandKitFields;

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
            _ => None,
        }
    }

    fn from_draft(id: i64, now: DateTime<Utc>, draft: BrandKitDraft) -> Self {
        let fields = draft.fields;
        Self {
            id,
            user_id: draft.user_id,
            primary_color: fields.primary_color,
            secondary_color: fields.secondary_color,
            accent_color: fields.accent_color,
            font_family: fields.font_family,
            logo_url: fields.logo_url,
            watermark_text: fields.watermark_text,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: BrandKitFields, now: DateTime<Utc>) {
        self.primary_color = fields.primary_color;
        self.secondary_color = fields.secondary_color;
        self.accent_color = fields.accent_color;
        self.font_family = fields.font_family;
        self.logo_url = fields.logo_url;
        self.watermark_text = fields.watermark_text;
        self.updated_at = now;
    }

    fn insert_params(draft: &BrandKitDraft) -> Vec<(&'static str, SqlParam)> {
        let mut params = vec![("user_id", SqlParam::Int(Some(draft.user_id)))];
        params.extend(Self::update_params(&draft.fields));
        params
    }

    fn update_params(fields: &BrandKitFields) -> Vec<(&'static str, SqlParam)> {
        vec![
            ("primary_color", SqlParam::Text(Some(fields.primary_color.clone()))),
            ("secondary_color", SqlParam::Text(Some(fields.secondary_color.clone()))),
            ("accent_color", SqlParam::Text(Some(fields.accent_color.clone()))),
            ("font_family", SqlParam::Text(Some(fields.font_family.clone()))),
            ("logo_url", SqlParam::Text(fields.logo_url.clone())),
            ("watermark_text", SqlParam::Text(fields.watermark_text.clone())),
        ]
    }
}
