//! Moderation endpoints for admin accounts

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::{load_catalog, require_profile};
use crate::app::AppState;
use crate::market::model::{Product, User};
use crate::store::storage::PRODUCT_IMAGES_BUCKET;

async fn require_admin(state: &AppState, auth: &AuthenticatedUser) -> Result<User, AppError> {
    let user = require_profile(state, auth.user_id).await?;
    if !user.is_admin {
        warn!(user_id = %auth.user_id, "non-admin hit an admin route");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListing {
    #[serde(flatten)]
    product: Product,
    seller_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    products: Vec<AdminListing>,
    users: Vec<User>,
    total_products: usize,
    total_users: usize,
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<AdminOverview>, AppError> {
    require_admin(&state, &auth).await?;
    let (products, users) = load_catalog(&state).await?;

    let names: HashMap<Uuid, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();
    let products: Vec<AdminListing> = products
        .into_iter()
        .map(|product| AdminListing {
            seller_name: names
                .get(&product.seller_id)
                .copied()
                .unwrap_or("Unknown")
                .to_string(),
            product,
        })
        .collect();

    Ok(Json(AdminOverview {
        total_products: products.len(),
        total_users: users.len(),
        products,
        users,
    }))
}

pub async fn remove_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let admin = require_admin(&state, &auth).await?;
    let removed = state
        .product_store
        .delete_any(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    state
        .storage
        .remove_by_url(PRODUCT_IMAGES_BUCKET, &removed.image_id)
        .await;

    info!(product_id = %product_id, admin_id = %admin.id, "listing removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
