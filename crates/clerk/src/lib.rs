//! Identity-provider client.
//!
//! The identity provider owns session issuance, token lifetimes, and the
//! sign-in flows; this crate consumes two narrow contracts on top of its
//! backend API: "is this bearer token a valid session, and for which user"
//! and "what profile data is on file for this user". It also models the
//! webhook payload the provider posts when a user is created.

#![warn(rust_2018_idioms)]

pub mod webhook;

pub use webhook::{EmailAddress, PhoneNumber, UserCreated, WebhookEvent, USER_CREATED};

use std::time::Duration;

/// Default backend API endpoint.
const CLERK_API_URL: &str = "https://api.clerk.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClerkError {
    #[error("identity provider rejected the session")]
    Unauthorized,
    #[error("failed to connect to the identity provider: {0}")]
    Connect(reqwest::Error),
    #[error("identity-provider request failed: {0}")]
    Http(reqwest::Error),
    #[error("identity provider answered {status}: {body}")]
    Api { status: u16, body: String },
}

pub type ClerkResult<T> = std::result::Result<T, ClerkError>;

/// A verified session: which user the bearer token belongs to.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AuthSession {
    pub user_id: String,
}

/// Profile data the provider has on file for a user.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<IdentifiedEmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct IdentifiedEmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

impl ClerkUser {
    /// Display name assembled from the stored name parts, or `None` when
    /// neither part is on file.
    pub fn full_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// The address marked primary, falling back to the first on file.
    pub fn primary_email(&self) -> Option<&str> {
        let by_id = self.primary_email_address_id.as_ref().and_then(|primary| {
            self.email_addresses
                .iter()
                .find(|address| address.id.as_ref() == Some(primary))
        });

        by_id
            .or_else(|| self.email_addresses.first())
            .map(|address| address.email_address.as_str())
    }
}

#[derive(Debug, serde::Serialize)]
struct VerifyTokenRequest<'a> {
    token: &'a str,
}

/// Client for the identity provider's backend API.
pub struct ClerkClient {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl ClerkClient {
    /// Creates a client authenticated with the backend secret key.
    pub fn new(secret_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            secret_key: secret_key.into(),
            base_url: CLERK_API_URL.to_string(),
        }
    }

    /// Verifies a bearer session token and returns the session it belongs to.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the provider rejects the token; `Connect`/`Http`/
    /// `Api` for transport and unexpected upstream failures.
    pub async fn verify_token(&self, token: &str) -> ClerkResult<AuthSession> {
        let url = format!("{}/v1/tokens/verify", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&VerifyTokenRequest { token })
            .send()
            .await
            .map_err(connect_or_http)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(ClerkError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClerkError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ClerkError::Http)
    }

    /// Fetches the profile data on file for `user_id`.
    pub async fn fetch_user(&self, user_id: &str) -> ClerkResult<ClerkUser> {
        let url = format!("{}/v1/users/{}", self.base_url, user_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(connect_or_http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClerkError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ClerkError::Http)
    }
}

fn connect_or_http(e: reqwest::Error) -> ClerkError {
    if e.is_connect() {
        ClerkError::Connect(e)
    } else {
        ClerkError::Http(e)
    }
}
