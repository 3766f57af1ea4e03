//! Candidate accounts, their CVs, interview sessions and agenda.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::{unwrap_data, unwrap_list};

const BASE_PATH: &str = "/users";

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

/// Page number and size; unset or zero values are left to the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl Pagination {
    fn apply(self, options: RequestOptions) -> RequestOptions {
        options
            .param("page", self.page.filter(|p| *p > 0))
            .param("size", self.size.filter(|s| *s > 0))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub unique_uid: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_country_code: Option<String>,
    #[serde(default)]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub cover_picture_url: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    #[serde(default)]
    pub interview_count: u64,
    #[serde(default)]
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LanguageLevel {
    pub lang: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Skills {
    #[serde(default)]
    pub hard_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub kpis: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// A parsed resume.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CvProfile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub resume_file_url: Option<String>,
    #[serde(default)]
    pub resume_file_name: Option<String>,
    #[serde(default)]
    pub is_parsed: bool,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<f64>,
    #[serde(default)]
    pub primary_domain: Option<String>,
    #[serde(default)]
    pub languages: Vec<LanguageLevel>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InterviewSession {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub cv_profile_id: Option<String>,
    #[serde(default)]
    pub job_position_id: Option<String>,
    #[serde(default)]
    pub interview_type: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub flow_type: Option<String>,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub recruiter_name: Option<String>,
    /// `completed`, `in_progress` or `cancelled`.
    pub status: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobPosition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectedDecor {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

/// A session with its candidate, position and generated report.
///
/// The report is kept as raw JSON; its shape depends on the generating model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InterviewSessionDetail {
    #[serde(flatten)]
    pub session: InterviewSession,
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub cv_profile: Value,
    #[serde(default)]
    pub job_position: Option<JobPosition>,
    #[serde(default)]
    pub selected_decor: Option<SelectedDecor>,
    #[serde(default)]
    pub report_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgendaEvent {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub interview_session_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `simulation`, `real_interview` or a backend-defined kind.
    pub event_type: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default)]
    pub google_calendar_link: Option<String>,
    #[serde(default)]
    pub ics_file_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

pub async fn list(client: &ApiClient, pagination: Pagination) -> Result<Page<User>, Error> {
    let options = pagination.apply(RequestOptions::new());
    let payload: Value = client.get(BASE_PATH, &options).await?;
    unwrap_data(payload)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<User, Error> {
    let payload: Value = client
        .get(&format!("{BASE_PATH}/{id}"), &RequestOptions::new())
        .await?;
    unwrap_data(payload)
}

/// The account the current token belongs to.
pub async fn me(client: &ApiClient) -> Result<User, Error> {
    let payload: Value = client
        .get(&format!("{BASE_PATH}/me"), &RequestOptions::new())
        .await?;
    unwrap_data(payload)
}

pub async fn cv(client: &ApiClient, user_id: &str) -> Result<CvProfile, Error> {
    let payload: Value = client
        .get(&format!("/cv/user/{user_id}"), &RequestOptions::new())
        .await?;
    unwrap_data(payload)
}

pub async fn interviews(
    client: &ApiClient,
    user_id: &str,
    pagination: Pagination,
) -> Result<Page<InterviewSession>, Error> {
    let options = pagination.apply(RequestOptions::new().param("user_id", user_id));
    let payload: Value = client.get("/interviews/sessions", &options).await?;
    unwrap_data(payload)
}

pub async fn interview_session(client: &ApiClient, session_id: &str) -> Result<InterviewSessionDetail, Error> {
    let payload: Value = client
        .get(&format!("/interviews/session/{session_id}"), &RequestOptions::new())
        .await?;
    unwrap_data(payload)
}

/// Calendar events of a user between two dates (`YYYY-MM-DD`, inclusive).
pub async fn agenda_events(
    client: &ApiClient,
    user_id: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<AgendaEvent>, Error> {
    let options = RequestOptions::new()
        .param("user_id", user_id)
        .param("start_date", start_date)
        .param("end_date", end_date);
    let payload: Value = client.get("/agenda/events", &options).await?;
    unwrap_list(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_detail_flattens_session_fields() {
        let detail: InterviewSessionDetail = serde_json::from_value(json!({
            "id": "s1",
            "user_id": "u1",
            "status": "completed",
            "job_position": {"id": "j1", "title": "Backend engineer"},
            "selected_decor": null,
            "report_data": {"gpt_report": "Strong candidate"}
        }))
        .unwrap();

        assert_eq!(detail.session.id, "s1");
        assert_eq!(detail.job_position.unwrap().title, "Backend engineer");
        assert!(detail.selected_decor.is_none());
        assert_eq!(detail.report_data.unwrap()["gpt_report"], "Strong candidate");
    }

    #[test]
    fn test_user_tolerates_sparse_payload() {
        let user: User = serde_json::from_value(json!({"id": "u1", "email": "a@b.c"})).unwrap();
        assert!(user.social_links.is_empty());
        assert_eq!(user.interview_count, 0);
    }
}
