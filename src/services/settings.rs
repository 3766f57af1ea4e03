//! Dynamic key/value settings (voices, limits, feature switches).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::{unwrap_data, unwrap_list};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SettingItem {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSetting {
    pub key: String,
    pub value: String,
    pub description: String,
}

pub async fn get_all(client: &ApiClient) -> Result<Vec<SettingItem>, Error> {
    let payload: Value = client.get("/settings", &RequestOptions::new()).await?;
    unwrap_list(payload)
}

pub async fn update(client: &ApiClient, key: &str, value: &str) -> Result<SettingItem, Error> {
    let payload: Value = client
        .patch(
            &format!("/settings/{key}"),
            Some(&json!({ "value": value })),
            &RequestOptions::new(),
        )
        .await?;
    unwrap_data(payload)
}

pub async fn create(client: &ApiClient, setting: &NewSetting) -> Result<SettingItem, Error> {
    let payload: Value = client.post("/settings", Some(setting), &RequestOptions::new()).await?;
    unwrap_data(payload)
}
