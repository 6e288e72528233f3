//! Request and response bodies for the REST surface.
//!
//! Wire naming follows what the dashboard's front end already consumes:
//! camelCase for the session/profile/autofill payloads, snake_case for the
//! stored prescription rows it reads straight out of the hosted store.

use docmate_core::{PrescriptionFields, ProfileFields};
use utoipa::ToSchema;

/// Health summary: overall status plus per-dependency readiness.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub services: ServicesStatus,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ServicesStatus {
    pub supabase: bool,
    pub gemini: bool,
    pub model: String,
}

/// Error body shared by all failure responses. `details` and `model` are
/// only present where the endpoint defines them.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            model: None,
        }
    }
}

/// Informational body for webhook acknowledgements.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRes {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct GenerateReq {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct GenerateRes {
    pub success: bool,
    pub result: String,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct CreatePrescriptionReq {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub history: String,
}

/// Outcome of a generate-and-save request. `saved` is false when the text
/// was produced but could not be persisted; the text is returned either way.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct CreatePrescriptionRes {
    pub success: bool,
    pub result: String,
    pub display: String,
    pub saved: bool,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct RecentPrescriptionsRes {
    pub prescriptions: Vec<PrescriptionRes>,
}

/// Stored prescription row as served to the dashboard.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct PrescriptionRes {
    pub id: String,
    pub title: String,
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub history: String,
    pub ai_result: String,
    pub created_at: String,
}

impl From<supabase::Prescription> for PrescriptionRes {
    fn from(row: supabase::Prescription) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            patient_name: row.patient_name,
            age: row.age,
            gender: row.gender,
            symptoms: row.symptoms,
            history: row.history,
            ai_result: row.ai_result,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AutofillReq {
    #[serde(default)]
    pub ai_result: String,
}

/// The six structured fields recovered from a generated reply.
#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutofillRes {
    pub diagnosis: String,
    pub test_or_surgery: String,
    pub medications: String,
    pub dosage_instructions: String,
    pub follow_up_advice: String,
    pub notes_observations: String,
}

impl From<PrescriptionFields> for AutofillRes {
    fn from(fields: PrescriptionFields) -> Self {
        Self {
            diagnosis: fields.diagnosis,
            test_or_surgery: fields.test_or_surgery,
            medications: fields.medications,
            dosage_instructions: fields.dosage_instructions,
            follow_up_advice: fields.follow_up_advice,
            notes_observations: fields.notes_observations,
        }
    }
}

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRes {
    pub full_name: String,
    pub email: String,
    pub specialization: String,
}

impl From<ProfileFields> for ProfileRes {
    fn from(fields: ProfileFields) -> Self {
        Self {
            full_name: fields.full_name,
            email: fields.email,
            specialization: fields.specialization,
        }
    }
}

#[derive(Debug, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub specialization: String,
}
