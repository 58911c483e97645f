//! Seller pages, platform rating and diversion analytics

use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::{load_catalog, require_profile};
use crate::app::AppState;
use crate::market::analytics::{self, MonthlyDiversion};
use crate::market::catalog::{self, SellerRanking};
use crate::market::forms::RatingForm;
use crate::market::model::{Product, PublicSeller};
use crate::store::products::ProductFilter;
use crate::store::ratings::RatingSummary;

pub async fn top_sellers(
    State(state): State<AppState>,
) -> Result<Json<Vec<SellerRanking>>, AppError> {
    let (products, users) = load_catalog(&state).await?;
    Ok(Json(catalog::top_sellers(&users, &products)))
}

#[derive(Serialize)]
pub struct SellerPage {
    seller: PublicSeller,
    products: Vec<Product>,
}

pub async fn seller_page(
    State(state): State<AppState>,
    Path(seller_id): Path<Uuid>,
) -> Result<Json<SellerPage>, AppError> {
    let filter = ProductFilter {
        seller_id: Some(seller_id),
    };
    let (seller, products) = futures::try_join!(
        require_profile(&state, seller_id),
        async { state.product_store.list(&filter).await.map_err(AppError::from) },
    )?;

    Ok(Json(SellerPage {
        seller: seller.public_view(),
        products: catalog::seller_listings(products),
    }))
}

pub async fn rating_summary(
    State(state): State<AppState>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(state.rating_store.summary().await?))
}

pub async fn rate_platform(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(form): Json<RatingForm>,
) -> Result<Json<RatingSummary>, AppError> {
    form.validate()?;
    state.rating_store.rate(auth.user_id, form.rating).await?;
    info!(user_id = %auth.user_id, rating = form.rating, "platform rated");
    Ok(Json(state.rating_store.summary().await?))
}

async fn load_diversion(state: &AppState) -> Result<Vec<MonthlyDiversion>, AppError> {
    let now = Utc::now();
    let sold = state
        .product_store
        .sold_since(analytics::window_start(now))
        .await?;
    Ok(analytics::monthly_diversion(
        now,
        sold.into_iter().map(|s| (s.created_at, s.price)),
    ))
}

pub async fn diversion(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyDiversion>>, AppError> {
    Ok(Json(load_diversion(&state).await?))
}

#[derive(Serialize)]
pub struct ImpactResponse {
    months: Vec<MonthlyDiversion>,
    report: String,
}

pub async fn impact(State(state): State<AppState>) -> Result<Json<ImpactResponse>, AppError> {
    let months = load_diversion(&state).await?;
    let report = state.ai.analyze_impact(&months).await?;
    Ok(Json(ImpactResponse {
        months,
        report: report.report,
    }))
}
