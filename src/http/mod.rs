pub mod accounts;
pub mod admin;
pub mod ai;
pub mod community;
pub mod error;
pub mod middleware;
pub mod products;
pub mod routes;
#[cfg(test)]
pub(crate) mod test_support;

pub use routes::build_router;

use uuid::Uuid;

use crate::app::AppState;
use crate::market::model::{Product, User};
use crate::store::products::ProductFilter;
use error::AppError;

/// Profile of `user_id`, or 404 when the company has none
pub(crate) async fn require_profile(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    state
        .profile_store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Every listing (newest first) and every profile, fetched together
pub(crate) async fn load_catalog(state: &AppState) -> Result<(Vec<Product>, Vec<User>), AppError> {
    let filter = ProductFilter::default();
    let (products, users) = futures::try_join!(
        state.product_store.list(&filter),
        state.profile_store.list_users(),
    )?;
    Ok((products, users))
}
