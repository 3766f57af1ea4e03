//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::unwrap_data;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardKpis {
    pub total_users: u64,
    pub new_users_30d: u64,
    pub total_interviews: u64,
    pub completed_interviews: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActivityPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SectorShare {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Charts {
    #[serde(default)]
    pub activity_30d: Vec<ActivityPoint>,
    #[serde(default)]
    pub sectors: Vec<SectorShare>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecentActivity {
    pub id: String,
    pub user_name: String,
    pub user_email: String,
    pub date: String,
    pub status: String,
    pub score: f64,
    #[serde(rename = "type")]
    pub activity_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardData {
    pub kpis: DashboardKpis,
    pub charts: Charts,
    #[serde(default)]
    pub recent_activity: Vec<RecentActivity>,
}

pub async fn stats(client: &ApiClient) -> Result<DashboardData, Error> {
    let payload: Value = client.get("/dashboard/admin", &RequestOptions::new()).await?;
    unwrap_data(payload)
}
