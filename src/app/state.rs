//! Application state shared across routes

use std::sync::Arc;

use crate::ai::AiService;
use crate::config::Config;
use crate::store::{
    AuthClient, ProductStore, ProfileStore, RatingStore, StorageClient, SupabaseClient,
};
use crate::util::rate_limit::RateLimits;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profile_store: ProfileStore,
    pub product_store: ProductStore,
    pub rating_store: RatingStore,
    pub storage: StorageClient,
    pub auth: AuthClient,
    pub ai: AiService,
    pub rate_limits: RateLimits,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Initialize Supabase clients
        let supabase = SupabaseClient::new(&config);
        let storage = StorageClient::new(&config);
        let auth = AuthClient::new(&config);

        // Initialize stores
        let profile_store = ProfileStore::new(supabase.clone());
        let product_store = ProductStore::new(supabase.clone());
        let rating_store = RatingStore::new(supabase);

        let ai = AiService::new(&config);

        Self {
            config,
            profile_store,
            product_store,
            rating_store,
            storage,
            auth,
            ai,
            rate_limits: RateLimits::default(),
        }
    }
}
