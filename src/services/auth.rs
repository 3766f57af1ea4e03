//! Authentication endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Error, RequestOptions};
use crate::services::unwrap_data;

#[derive(Debug, Serialize)]
pub struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Log in and store the returned tokens in the client's session.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<LoginResponse, Error> {
    let payload: Value = client
        .post("/auth/login", Some(&LoginPayload { email, password }), &RequestOptions::new())
        .await?;
    let response: LoginResponse = unwrap_data(payload)?;

    client
        .session()
        .login(&response.access_token, response.refresh_token.as_deref())?;
    tracing::info!(role = ?response.role, "Logged in");
    Ok(response)
}

/// Ask the backend to send a password reset to the administrator.
pub async fn reset_password(client: &ApiClient) -> Result<Value, Error> {
    client
        .post::<Value, ()>("/admin/reset-password", None, &RequestOptions::new())
        .await
}

/// Drop the session locally: token slot and durable storage.
pub fn logout(client: &ApiClient) -> Result<(), Error> {
    client.session().logout()?;
    Ok(())
}
