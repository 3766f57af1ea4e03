//! Business sectors used to classify job sheets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::{unwrap_data, unwrap_list};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorForm {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<&Sector> for SectorForm {
    fn from(sector: &Sector) -> Self {
        Self {
            name: sector.name.clone(),
            description: sector.description.clone(),
            is_active: sector.is_active,
        }
    }
}

/// Pagination for [`list`]; defaults to the first 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorFilters {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(client: &ApiClient, filters: SectorFilters) -> Result<Vec<Sector>, Error> {
    let options = RequestOptions::new()
        .param("skip", filters.skip.unwrap_or(0))
        .param("limit", filters.limit.unwrap_or(100));
    let payload: Value = client.get("/sectors", &options).await?;
    unwrap_list(payload)
}

pub async fn create(client: &ApiClient, form: &SectorForm) -> Result<Sector, Error> {
    let payload: Value = client.post("/sectors", Some(form), &RequestOptions::new()).await?;
    unwrap_data(payload)
}

pub async fn update(client: &ApiClient, id: &str, form: &SectorForm) -> Result<Sector, Error> {
    let payload: Value = client
        .put(&format!("/sectors/{id}"), Some(form), &RequestOptions::new())
        .await?;
    unwrap_data(payload)
}

/// Flip `is_active` by re-submitting the sector.
pub async fn toggle_status(client: &ApiClient, sector: &Sector) -> Result<Sector, Error> {
    let mut form = SectorForm::from(sector);
    form.is_active = !sector.is_active;
    update(client, &sector.id, &form).await
}

pub async fn delete(client: &ApiClient, id: &str) -> Result<(), Error> {
    let _: Value = client
        .delete::<Value, ()>(&format!("/sectors/{id}"), None, &RequestOptions::new())
        .await?;
    Ok(())
}
