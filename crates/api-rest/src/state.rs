//! Shared application state.

use std::sync::Arc;

use clerk::ClerkClient;
use docmate_core::{AppConfig, FileProfileStore, ProfileService};
use gemini::GeminiClient;
use supabase::SupabaseClient;

/// Application state shared across REST API handlers.
///
/// Holds the startup configuration, the three vendor clients, and the
/// profile service. Everything is behind `Arc` so the state clones cheaply
/// into each handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub gemini: Arc<GeminiClient>,
    pub clerk: Arc<ClerkClient>,
    pub store: Arc<SupabaseClient>,
    pub profiles: Arc<ProfileService<FileProfileStore>>,
}

impl AppState {
    /// Builds the full state from resolved configuration, constructing the
    /// vendor clients and the file-backed profile store.
    pub fn from_config(cfg: AppConfig) -> Self {
        let gemini = GeminiClient::new(cfg.gemini_api_key(), cfg.gemini_model());
        let clerk = ClerkClient::new(cfg.clerk_secret_key());
        let store = SupabaseClient::new(cfg.supabase_url(), cfg.supabase_service_role_key());
        let profiles = ProfileService::new(FileProfileStore::new(cfg.profile_data_dir()));

        Self {
            cfg: Arc::new(cfg),
            gemini: Arc::new(gemini),
            clerk: Arc::new(clerk),
            store: Arc::new(store),
            profiles: Arc::new(profiles),
        }
    }
}
