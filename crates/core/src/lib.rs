//! # DocMate Core
//!
//! Core dashboard logic for the DocMate medical-practice service:
//! - Prescription prompt construction and structured-field extraction
//! - First-run profile bootstrap over a per-user override store
//! - Runtime configuration resolved once at startup
//!
//! **No API concerns**: HTTP servers, session verification, or vendor
//! clients belong in `api-rest`, `clerk`, `gemini`, or `supabase`.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod constants;
pub mod prescription;
pub mod profile;
pub mod text;

pub use config::{environment_from_env_value, AppConfig, ConfigError, Environment};
pub use prescription::{
    extract_fields, format_for_display, prescription_prompt, PrescriptionFields,
};
pub use profile::{
    reconcile, FileProfileStore, IdentityProfile, ProfileError, ProfileFields, ProfileRecord,
    ProfileResult, ProfileService, ProfileStore,
};
pub use text::{NonEmptyText, TextError};
