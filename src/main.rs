//! DocMate server binary.
//!
//! ## Purpose
//! Runs the dashboard's REST API: the generative-text proxy, the
//! identity-provider webhook sink, and the profile/prescription routes.
//!
//! ## Environment Variables
//! Required (the process exits non-zero naming the first one missing):
//! - `CLERK_SECRET_KEY`: identity-provider backend secret
//! - `GEMINI_API_KEY`: generative-text service API key
//! - `SUPABASE_URL`: hosted-store project URL
//! - `SUPABASE_SERVICE_ROLE_KEY`: hosted-store service-role key
//!
//! Optional:
//! - `GEMINI_MODEL`: generative model name (default: "gemini-1.5-flash")
//! - `PROFILE_DATA_DIR`: per-user profile documents (default: "/profile_data")
//! - `DOCMATE_REST_ADDR`: server address (default: "0.0.0.0:3000")
//! - `DOCMATE_ENV`: "development" or "production" (default: production);
//!   development includes raw upstream error detail in 500 bodies

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use docmate_core::{
    constants::{DEFAULT_GEMINI_MODEL, DEFAULT_PROFILE_DATA_DIR},
    environment_from_env_value, AppConfig,
};

const REQUIRED_ENV_VARS: [&str; 4] = [
    "CLERK_SECRET_KEY",
    "GEMINI_API_KEY",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
];

/// Main entry point for the DocMate REST API server
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - a required environment variable is missing,
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docmate=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    for var in REQUIRED_ENV_VARS {
        let present = std::env::var(var).is_ok_and(|value| !value.trim().is_empty());
        if !present {
            anyhow::bail!("missing required environment variable: {var}");
        }
    }

    let cfg = AppConfig::new(
        std::env::var("CLERK_SECRET_KEY")?,
        std::env::var("GEMINI_API_KEY")?,
        std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
        std::env::var("SUPABASE_URL")?,
        std::env::var("SUPABASE_SERVICE_ROLE_KEY")?,
        std::env::var("PROFILE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_DATA_DIR)),
        environment_from_env_value(std::env::var("DOCMATE_ENV").ok())?,
    )?;

    let addr = std::env::var("DOCMATE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting DocMate REST API on {}", addr);
    tracing::info!("-- Generative model: {}", cfg.gemini_model());

    let app = api_rest::build_router(AppState::from_config(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
