//! Hosted-store client.
//!
//! The hosted relational backend owns the schema, durability, and
//! replication; the dashboard reaches it over the PostgREST interface with
//! the service-role key. Two tables are touched: `users` (seeded from
//! identity-provider webhooks, pending approval) and `prescriptions` (the
//! raw generated text plus the patient details it was produced for).
//!
//! Only the raw generated text is stored. The structured fields derived
//! from it are recomputed on demand by the caller and never written back.

#![warn(rust_2018_idioms)]

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to the hosted store: {0}")]
    Connect(reqwest::Error),
    #[error("hosted-store request failed: {0}")]
    Http(reqwest::Error),
    #[error("hosted store answered {status}: {body}")]
    Api { status: u16, body: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Row inserted into `users` when the identity provider announces a new
/// user. Accounts start unapproved and are switched on out of band.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewUser {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_approved: bool,
}

/// Row inserted into `prescriptions`. `ai_result` is the raw reply text.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewPrescription {
    pub title: String,
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub history: String,
    pub ai_result: String,
}

/// Stored prescription row.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub title: String,
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub history: String,
    pub ai_result: String,
    pub created_at: DateTime<Utc>,
}

/// Client for the hosted store's REST interface.
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url` using the
    /// service-role key.
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// Inserts the user row, merging with an existing row for the same id.
    pub async fn upsert_user(&self, user: &NewUser) -> StoreResult<()> {
        let response = self
            .request(self.client.post(self.table_url("users")))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[user])
            .send()
            .await
            .map_err(connect_or_http)?;

        check_status(response).await.map(|_| ())
    }

    /// Inserts a prescription row. The generated text goes in verbatim.
    pub async fn insert_prescription(&self, row: &NewPrescription) -> StoreResult<()> {
        let response = self
            .request(self.client.post(self.table_url("prescriptions")))
            .json(&[row])
            .send()
            .await
            .map_err(connect_or_http)?;

        check_status(response).await.map(|_| ())
    }

    /// The newest `limit` prescription rows, newest first.
    pub async fn recent_prescriptions(&self, limit: usize) -> StoreResult<Vec<Prescription>> {
        let url = format!(
            "{}?select=*&order=created_at.desc&limit={}",
            self.table_url("prescriptions"),
            limit
        );

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(connect_or_http)?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(StoreError::Http)
    }
}

fn connect_or_http(e: reqwest::Error) -> StoreError {
    if e.is_connect() {
        StoreError::Connect(e)
    } else {
        StoreError::Http(e)
    }
}

async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "hosted store rejected request");
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_normalises_trailing_slash() {
        let client = SupabaseClient::new("https://example.supabase.co/", "service-role");
        assert_eq!(
            client.table_url("users"),
            "https://example.supabase.co/rest/v1/users"
        );
    }

    #[test]
    fn test_new_user_serialises_approval_flag() {
        let user = NewUser {
            id: "user_abc123".into(),
            email: Some("asha@example.com".into()),
            phone: None,
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            created_at: DateTime::from_timestamp_millis(1654012591514),
            is_approved: false,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["is_approved"], false);
        assert_eq!(json["email"], "asha@example.com");
        assert!(json["phone"].is_null());
        assert_eq!(json["created_at"], "2022-05-31T15:56:31.514Z");
    }

    #[test]
    fn test_prescription_row_round_trips() {
        let row: Prescription = serde_json::from_str(
            r#"{
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "title": "Mr",
                "patient_name": "John Smith",
                "age": "25",
                "gender": "Male",
                "symptoms": "persistent cough",
                "history": "asthma",
                "ai_result": "1. Diagnosis: Bronchitis",
                "created_at": "2026-08-01T09:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(row.patient_name, "John Smith");
        assert_eq!(row.ai_result, "1. Diagnosis: Bronchitis");
        assert_eq!(
            serde_json::to_value(&row).unwrap()["id"],
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }
}
