//! Webhook event payloads.
//!
//! The identity provider posts an event envelope `{type, data}` to the
//! dashboard's webhook endpoint. Only `user.created` is consumed; the
//! payload mirrors the provider's user object closely enough to lift out
//! the fields the hosted store keeps.

use chrono::{DateTime, Utc};

/// Event type announcing a newly created user.
pub const USER_CREATED: &str = "user.created";

/// Event envelope as posted by the provider.
#[derive(Debug, serde::Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PhoneNumber {
    pub phone_number: String,
}

/// `user.created` payload.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserCreated {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Creation instant in epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl UserCreated {
    /// First email address on the payload, if any.
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|address| address.email_address.as_str())
    }

    /// First phone number on the payload, if any.
    pub fn primary_phone(&self) -> Option<&str> {
        self.phone_numbers
            .first()
            .map(|number| number.phone_number.as_str())
    }

    /// Creation instant as a UTC timestamp. `None` when the payload omits
    /// it or carries a value outside the representable range.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(DateTime::from_timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_EVENT: &str = r#"{
        "type": "user.created",
        "data": {
            "id": "user_29w83sxmDNGwOuEthce5gg56FcC",
            "first_name": "Asha",
            "last_name": "Rao",
            "created_at": 1654012591514,
            "email_addresses": [{"email_address": "asha@example.com"}],
            "phone_numbers": [{"phone_number": "+15551234567"}]
        }
    }"#;

    #[test]
    fn test_event_envelope_and_payload_parse() {
        let event: WebhookEvent = serde_json::from_str(SAMPLE_EVENT).unwrap();
        assert_eq!(event.kind, USER_CREATED);

        let user: UserCreated = serde_json::from_value(event.data).unwrap();
        assert_eq!(user.id, "user_29w83sxmDNGwOuEthce5gg56FcC");
        assert_eq!(user.primary_email().unwrap(), "asha@example.com");
        assert_eq!(user.primary_phone().unwrap(), "+15551234567");
    }

    #[test]
    fn test_payload_tolerates_missing_contact_details() {
        let user: UserCreated =
            serde_json::from_str(r#"{"id": "user_min"}"#).unwrap();

        assert!(user.primary_email().is_none());
        assert!(user.primary_phone().is_none());
        assert!(user.first_name.is_none());
        assert!(user.created_at_utc().is_none());
    }

    #[test]
    fn test_created_at_converts_epoch_millis() {
        let user: UserCreated =
            serde_json::from_str(r#"{"id": "user_ts", "created_at": 1654012591514}"#).unwrap();

        let ts = user.created_at_utc().unwrap();
        assert_eq!(ts.timestamp_millis(), 1654012591514);
    }
}
