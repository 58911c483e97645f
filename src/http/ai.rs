//! AI helper endpoints, limited per user

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use crate::ai::appraisal::{Appraisal, AppraisalInput};
use crate::ai::assistant::{ChatInput, ChatOutput};
use crate::ai::listing::{CategoryInput, CategoryOutput, DescribeInput, DescribeOutput};
use crate::app::AppState;
use crate::market::model::{Product, PRODUCT_CATEGORIES};
use crate::store::products::ProductFilter;

fn check_budget(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    if state.rate_limits.check_ai(user_id) {
        Ok(())
    } else {
        Err(AppError::RateLimited)
    }
}

pub async fn describe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<DescribeInput>,
) -> Result<Json<DescribeOutput>, AppError> {
    check_budget(&state, auth.user_id)?;
    Ok(Json(state.ai.suggest_description(&input).await?))
}

pub async fn suggest_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<CategoryOutput>, AppError> {
    check_budget(&state, auth.user_id)?;
    Ok(Json(
        state.ai.suggest_category(&input, PRODUCT_CATEGORIES).await?,
    ))
}

/// Either an existing listing or the fields of one being drafted
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AppraiseRequest {
    Listing {
        #[serde(rename = "productId")]
        product_id: Uuid,
    },
    Draft(AppraisalInput),
}

fn appraisal_input(product: Product) -> AppraisalInput {
    AppraisalInput {
        product_name: product.name,
        description: product.description,
        category: product.category,
        photo_data_uri: product.image_id,
    }
}

pub async fn appraise(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<AppraiseRequest>,
) -> Result<Json<Appraisal>, AppError> {
    check_budget(&state, auth.user_id)?;

    let input = match req {
        AppraiseRequest::Listing { product_id } => state
            .product_store
            .get(product_id)
            .await?
            .map(appraisal_input)
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?,
        AppraiseRequest::Draft(input) => input,
    };

    Ok(Json(state.ai.appraise_waste(&input).await?))
}

pub async fn chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatOutput>, AppError> {
    check_budget(&state, auth.user_id)?;
    if input.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is empty.".to_string()));
    }

    let products = state.product_store.list(&ProductFilter::default()).await?;
    let available: Vec<Product> = products.into_iter().filter(|p| !p.is_sold).collect();
    Ok(Json(state.ai.chat(&input, &available).await?))
}
