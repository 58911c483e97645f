//! Waste stream listings (`products` table)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};
use crate::market::model::{Product, ProductStatus, PLACEHOLDER_IMAGE_ID};

/// Raw listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.product_name,
            description: row.description.unwrap_or_default(),
            price: row.price,
            category: row.category,
            image_id: row
                .image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_ID.to_string()),
            seller_id: row.seller_id,
            is_sold: row.status.as_deref() == Some(ProductStatus::Sold.as_str()),
            created_at: row.created_at,
            whatsapp_number: row.whatsapp_number,
        }
    }
}

/// New listing for insertion
#[derive(Debug, Clone, Serialize)]
pub struct NewProductRow {
    pub seller_id: Uuid,
    pub product_name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub seller_name: String,
    pub whatsapp_number: String,
}

/// Listing edit made by its owner
#[derive(Debug, Clone, Serialize)]
pub struct ProductChanges {
    pub product_name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub whatsapp_number: String,
    /// Only sent when a new photo replaced the old one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Price and date of a sold listing, for diversion analytics
#[derive(Debug, Clone, Deserialize)]
pub struct SoldEntry {
    pub created_at: DateTime<Utc>,
    pub price: f64,
}

/// Optional filter for listing queries
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub seller_id: Option<Uuid>,
}

/// Product store operations
#[derive(Clone)]
pub struct ProductStore {
    client: SupabaseClient,
}

impl ProductStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Listings, newest first
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, SupabaseError> {
        let mut query = String::from("select=*&order=created_at.desc");
        if let Some(seller_id) = filter.seller_id {
            query.push_str(&format!("&seller_id=eq.{}", seller_id));
        }
        let rows: Vec<ProductRow> = self.client.get("products", &query).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Option<Product>, SupabaseError> {
        let query = format!("id=eq.{}&select=*", product_id);
        let row: Option<ProductRow> = self.client.get_one("products", &query).await?;
        Ok(row.map(Product::from))
    }

    pub async fn insert(&self, row: &NewProductRow) -> Result<Product, SupabaseError> {
        let created: ProductRow = self.client.insert("products", row).await?;
        Ok(created.into())
    }

    /// Update a listing only if `seller_id` owns it
    pub async fn update_owned(
        &self,
        product_id: Uuid,
        seller_id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, SupabaseError> {
        let query = format!("id=eq.{}&seller_id=eq.{}", product_id, seller_id);
        let rows: Vec<ProductRow> = self
            .client
            .update_returning("products", &query, changes)
            .await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    /// Mark a listing sold or available again
    pub async fn set_status(
        &self,
        product_id: Uuid,
        seller_id: Uuid,
        status: ProductStatus,
    ) -> Result<Option<Product>, SupabaseError> {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: ProductStatus,
        }

        let query = format!("id=eq.{}&seller_id=eq.{}", product_id, seller_id);
        let rows: Vec<ProductRow> = self
            .client
            .update_returning("products", &query, &StatusUpdate { status })
            .await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    /// Delete a listing owned by `seller_id`
    pub async fn delete_owned(
        &self,
        product_id: Uuid,
        seller_id: Uuid,
    ) -> Result<Option<Product>, SupabaseError> {
        let query = format!("id=eq.{}&seller_id=eq.{}", product_id, seller_id);
        let rows: Vec<ProductRow> = self.client.delete_returning("products", &query).await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    /// Delete any listing (moderation)
    pub async fn delete_any(&self, product_id: Uuid) -> Result<Option<Product>, SupabaseError> {
        let query = format!("id=eq.{}", product_id);
        let rows: Vec<ProductRow> = self.client.delete_returning("products", &query).await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    /// Sold listings created at or after `since`
    pub async fn sold_since(&self, since: DateTime<Utc>) -> Result<Vec<SoldEntry>, SupabaseError> {
        let query = format!(
            "select=created_at,price&status=eq.sold&created_at=gte.{}",
            since.format("%Y-%m-%dT%H:%M:%SZ")
        );
        self.client.get("products", &query).await
    }
}
