//! Listing endpoints

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::require_profile;
use crate::app::AppState;
use crate::market::catalog::{self, BrowseQuery};
use crate::market::forms::{normalize_phone, ListingForm};
use crate::market::image::ImageUpload;
use crate::market::indicators;
use crate::market::model::{known_category, Product, ProductStatus, PublicSeller};
use crate::store::products::{NewProductRow, ProductChanges, ProductFilter};
use crate::store::storage::PRODUCT_IMAGES_BUCKET;
use crate::util::time::unix_millis;

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        seller_id: query.seller_id,
    };
    let products = state.product_store.list(&filter).await?;
    let found = catalog::browse(&products, &query)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(found))
}

pub async fn featured_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.product_store.list(&ProductFilter::default()).await?;
    Ok(Json(catalog::featured(&products).into_iter().cloned().collect()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    product: Product,
    seller: Option<PublicSeller>,
    recyclability_score: u8,
    asset_fingerprint: String,
    contact_url: Option<String>,
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductDetail>, AppError> {
    let product = state
        .product_store
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let seller = state.profile_store.get_user(product.seller_id).await?;

    let id = product.id.to_string();
    Ok(Json(ProductDetail {
        recyclability_score: indicators::recyclability_score(&id),
        asset_fingerprint: indicators::asset_fingerprint(&id),
        contact_url: indicators::contact_link(&product, seller.as_ref()),
        seller: seller.as_ref().map(|s| s.public_view()),
        product,
    }))
}

pub async fn similar_products(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.product_store.list(&ProductFilter::default()).await?;
    let current = products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(
        catalog::similar(&products, current).into_iter().cloned().collect(),
    ))
}

/// Upload a listing photo under the seller's folder
async fn upload_listing_image(
    state: &AppState,
    seller_id: Uuid,
    data_uri: &str,
) -> Result<String, AppError> {
    let image = ImageUpload::from_data_uri(data_uri)?;
    let path = image.object_name(seller_id, unix_millis());
    let url = state
        .storage
        .upload(PRODUCT_IMAGES_BUCKET, &path, image.data, image.mime_type)
        .await?;
    Ok(url)
}

fn canonical_category(form: &ListingForm) -> String {
    known_category(&form.category)
        .map(str::to_string)
        .unwrap_or_else(|| form.category.clone())
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(form): Json<ListingForm>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    form.validate()?;
    let data_uri = form
        .image
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Product image is missing.".to_string()))?;

    let seller = require_profile(&state, auth.user_id).await.map_err(|e| match e {
        AppError::NotFound(_) => AppError::BadRequest(
            "User data is incomplete. Please update your profile.".to_string(),
        ),
        other => other,
    })?;

    let image_url = upload_listing_image(&state, seller.id, data_uri).await?;

    let row = NewProductRow {
        seller_id: seller.id,
        product_name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        price: form.price,
        category: canonical_category(&form),
        image_url: image_url.clone(),
        seller_name: seller.name.clone(),
        whatsapp_number: normalize_phone(&form.whatsapp_number),
    };

    match state.product_store.insert(&row).await {
        Ok(product) => {
            info!(product_id = %product.id, seller_id = %seller.id, "listing created");
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(e) => {
            warn!(error = %e, "listing insert failed, removing uploaded image");
            state
                .storage
                .remove_by_url(PRODUCT_IMAGES_BUCKET, &image_url)
                .await;
            Err(AppError::Internal(format!("Failed to save product: {}", e)))
        }
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(product_id): Path<Uuid>,
    Json(form): Json<ListingForm>,
) -> Result<Json<Product>, AppError> {
    form.validate()?;

    let existing = state
        .product_store
        .get(product_id)
        .await?
        .filter(|p| p.seller_id == auth.user_id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let new_image = match form.image.as_deref() {
        Some(data_uri) => Some(upload_listing_image(&state, auth.user_id, data_uri).await?),
        None => None,
    };

    let changes = ProductChanges {
        product_name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        price: form.price,
        category: canonical_category(&form),
        whatsapp_number: normalize_phone(&form.whatsapp_number),
        image_url: new_image.clone(),
    };

    let result = match state
        .product_store
        .update_owned(product_id, auth.user_id, &changes)
        .await
    {
        Ok(Some(updated)) => Ok(updated),
        Ok(None) => Err(AppError::NotFound("Product not found".to_string())),
        Err(e) => Err(AppError::from(e)),
    };

    // the replaced photo goes on success, the fresh upload on failure
    let stale = match (&result, &new_image) {
        (Ok(_), Some(_)) => Some(existing.image_id.as_str()),
        (Err(_), Some(uploaded)) => Some(uploaded.as_str()),
        (_, None) => None,
    };
    if let Some(url) = stale {
        state.storage.remove_by_url(PRODUCT_IMAGES_BUCKET, url).await;
    }

    let updated = result?;
    info!(product_id = %product_id, "listing updated");
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    sold: bool,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Product>, AppError> {
    let status = ProductStatus::from_sold(req.sold);
    let updated = state
        .product_store
        .set_status(product_id, auth.user_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    info!(product_id = %product_id, status = status.as_str(), "listing status changed");
    Ok(Json(updated))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .product_store
        .delete_owned(product_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    state
        .storage
        .remove_by_url(PRODUCT_IMAGES_BUCKET, &removed.image_id)
        .await;

    info!(product_id = %product_id, "listing deleted");
    Ok(StatusCode::NO_CONTENT)
}
