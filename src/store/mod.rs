//! Data store modules for Supabase integration

pub mod auth;
pub mod products;
pub mod profiles;
pub mod ratings;
pub mod storage;
pub mod supabase;

pub use auth::AuthClient;
pub use products::ProductStore;
pub use profiles::ProfileStore;
pub use ratings::RatingStore;
pub use storage::StorageClient;
pub use supabase::SupabaseClient;
