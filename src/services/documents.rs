//! Localized legal documents (terms, privacy policy), addressed by slug.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::unwrap_data;

const BASE_PATH: &str = "/documents";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub locale: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Partial document for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub async fn get_by_slug(client: &ApiClient, slug: &str, locale: &str) -> Result<Document, Error> {
    let options = RequestOptions::new().param("locale", locale);
    let payload: Value = client.get(&format!("{BASE_PATH}/{slug}"), &options).await?;
    unwrap_data(payload)
}

pub async fn create(client: &ApiClient, draft: &DocumentDraft) -> Result<Document, Error> {
    let payload: Value = client.post(BASE_PATH, Some(draft), &RequestOptions::new()).await?;
    unwrap_data(payload)
}

/// Update one translation; the backend selects it from the `locale` query parameter.
pub async fn update(client: &ApiClient, slug: &str, draft: &DocumentDraft) -> Result<Document, Error> {
    let options = RequestOptions::new().param("locale", draft.locale.as_deref());
    let payload: Value = client
        .put(&format!("{BASE_PATH}/{slug}"), Some(draft), &options)
        .await?;
    unwrap_data(payload)
}
