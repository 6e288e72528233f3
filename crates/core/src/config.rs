//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process
//! startup and then passed into request handlers through shared state. The
//! intent is to avoid reading process-wide environment variables during
//! request handling, which can lead to inconsistent behaviour in
//! multi-threaded runtimes and test harnesses.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment environment.
///
/// Controls whether raw upstream error detail is included in 500 response
/// bodies; everything else behaves identically in both environments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Dashboard configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    clerk_secret_key: String,
    gemini_api_key: String,
    gemini_model: String,
    supabase_url: String,
    supabase_service_role_key: String,
    profile_data_dir: PathBuf,
    environment: Environment,
}

impl AppConfig {
    /// Create a new `AppConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when any required value is empty after
    /// trimming.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clerk_secret_key: String,
        gemini_api_key: String,
        gemini_model: String,
        supabase_url: String,
        supabase_service_role_key: String,
        profile_data_dir: PathBuf,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("clerk_secret_key", &clerk_secret_key),
            ("gemini_api_key", &gemini_api_key),
            ("gemini_model", &gemini_model),
            ("supabase_url", &supabase_url),
            ("supabase_service_role_key", &supabase_service_role_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} cannot be empty")));
            }
        }

        Ok(Self {
            clerk_secret_key,
            gemini_api_key,
            gemini_model,
            supabase_url,
            supabase_service_role_key,
            profile_data_dir,
            environment,
        })
    }

    pub fn clerk_secret_key(&self) -> &str {
        &self.clerk_secret_key
    }

    pub fn gemini_api_key(&self) -> &str {
        &self.gemini_api_key
    }

    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    pub fn supabase_url(&self) -> &str {
        &self.supabase_url
    }

    pub fn supabase_service_role_key(&self) -> &str {
        &self.supabase_service_role_key
    }

    pub fn profile_data_dir(&self) -> &Path {
        &self.profile_data_dir
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

/// Parse the deployment environment from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `Production`.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` for any value other than `development` or
/// `production`.
pub fn environment_from_env_value(value: Option<String>) -> Result<Environment, ConfigError> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None | Some("production") => Ok(Environment::Production),
        Some("development") => Ok(Environment::Development),
        Some(other) => Err(ConfigError::Invalid(format!(
            "unknown environment: {other} (expected development or production)"
        ))),
    }
}
