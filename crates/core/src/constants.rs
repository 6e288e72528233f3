//! Fixed values shared across the dashboard.

/// Default directory for per-user profile documents.
pub const DEFAULT_PROFILE_DATA_DIR: &str = "/profile_data";

/// Generative model used when `GEMINI_MODEL` is not configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Specialisation seeded on first run when no override exists yet.
pub const DEFAULT_SPECIALIZATION: &str = "Cardiologist";
