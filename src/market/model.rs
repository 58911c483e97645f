//! Marketplace records as the API sees them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Industry sectors a waste stream can be listed under
pub const PRODUCT_CATEGORIES: &[&str] = &[
    "Plastics",
    "Metals & Scrap",
    "Paper & Cardboard",
    "Textiles",
    "Chemicals & Solvents",
    "Fly Ash & Slag",
    "Construction & Demolition",
    "E-Waste",
    "Rubber & Tyres",
    "Glass",
    "Wood & Biomass",
    "Agro & Food Processing",
];

/// Image id used when a listing has no uploaded picture
pub const PLACEHOLDER_IMAGE_ID: &str = "product-textbook";

/// Returns the canonical spelling of `category` if it is a known sector
pub fn known_category(category: &str) -> Option<&'static str> {
    PRODUCT_CATEGORIES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(category.trim()))
}

/// A registered company (producer or buyer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub company_description: Option<String>,
    pub location: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
}

impl User {
    /// Producers need a description and a location before they get a
    /// certificate or a "complete" badge on the dashboard
    pub fn profile_complete(&self) -> bool {
        has_text(&self.company_description) && has_text(&self.location)
    }

    /// The part of a profile shown to other companies
    pub fn public_view(&self) -> PublicSeller {
        PublicSeller {
            id: self.id,
            name: self.name.clone(),
            company: self.company.clone(),
            avatar: self.avatar.clone(),
            company_description: self.company_description.clone(),
            location: self.location.clone(),
            phone: self.phone.clone(),
            instagram_url: self.instagram_url.clone(),
            facebook_url: self.facebook_url.clone(),
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Seller profile without account details
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSeller {
    pub id: Uuid,
    pub name: String,
    pub company: String,
    pub avatar: Option<String>,
    pub company_description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
}

/// Listing status as stored in the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Available,
    Sold,
}

impl ProductStatus {
    pub fn from_sold(sold: bool) -> Self {
        if sold {
            ProductStatus::Sold
        } else {
            ProductStatus::Available
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Sold => "sold",
        }
    }
}

/// A listed waste stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in INR per ton
    pub price: f64,
    pub category: String,
    /// Either a placeholder image id or a public storage URL
    pub image_id: String,
    pub seller_id: Uuid,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    pub whatsapp_number: Option<String>,
}
