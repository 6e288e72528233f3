//! # API REST
//!
//! REST API implementation for DocMate.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Session verification against the identity provider
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! The server binary at the workspace root builds its router from
//! [`build_router`]; domain logic stays in `docmate-core` and the vendor
//! crates.

#![warn(rust_2018_idioms)]

mod auth;
mod routes;
mod state;
mod types;

pub use routes::build_router;
pub use state::AppState;
