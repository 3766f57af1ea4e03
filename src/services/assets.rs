//! Interview decor assets (background images per country).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions, UploadFile, UploadOptions};
use crate::services::{unwrap_data, unwrap_list};

const ASSETS_PATH: &str = "/interviews/assets";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub name: String,
    pub country_code: String,
    pub image_url: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssetPayload {
    pub asset_type: String,
    pub name: String,
    pub country_code: String,
    pub is_active: Option<bool>,
    pub image: UploadFile,
}

#[derive(Debug, Clone, Default)]
pub struct AssetListFilters {
    pub asset_type: Option<String>,
    pub country_code: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Upload a new asset; the image goes under the `image` field.
pub async fn create(client: &ApiClient, payload: AssetPayload) -> Result<Asset, Error> {
    let options = UploadOptions::new()
        .field_name("image")
        .field("type", payload.asset_type)
        .field("name", payload.name)
        .field("country_code", payload.country_code)
        .field("is_active", payload.is_active.unwrap_or(true).to_string());
    let response: Value = client.upload(ASSETS_PATH, payload.image, options).await?;
    unwrap_data(response)
}

pub async fn list(client: &ApiClient, filters: &AssetListFilters) -> Result<Vec<Asset>, Error> {
    let options = RequestOptions::new()
        .param("asset_type", filters.asset_type.as_deref())
        .param("country_code", filters.country_code.as_deref())
        .param("is_active", filters.is_active)
        .param("search", filters.search.as_deref());
    let response: Value = client.get(ASSETS_PATH, &options).await?;
    unwrap_list(response)
}
