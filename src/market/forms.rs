//! Request payloads and their field rules

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use super::model::known_category;

fn indian_mobile() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\+91)?[6-9]\d{9}$").expect("valid phone pattern"))
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if indian_mobile().is_match(value.trim()) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some("Please enter a valid 10-digit Indian mobile number.".into());
    Err(err)
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    if known_category(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("category");
    err.message = Some("Please select an industry sector.".into());
    Err(err)
}

/// Treat `""` as an absent optional field
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Prefix `+91` unless the number already carries it
pub fn normalize_phone(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with("+91") {
        return phone.to_string();
    }
    let local = phone
        .strip_prefix("91")
        .filter(|rest| rest.len() == 10)
        .unwrap_or(phone);
    format!("+91{}", local)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
    #[validate(length(min = 3, message = "Company name is required."))]
    pub company: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Fields of a waste stream listing. `image` is a data URI; it is required
/// on creation and optional on edit.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListingForm {
    #[validate(length(min = 3, message = "Waste material type must be at least 3 characters."))]
    pub name: String,
    #[validate(length(min = 10, message = "Composition/Condition must be at least 10 characters."))]
    pub description: String,
    #[validate(range(min = 0.01, message = "Price must be a positive number."))]
    pub price: f64,
    #[validate(custom = "validate_category")]
    pub category: String,
    #[validate(custom = "validate_phone")]
    pub whatsapp_number: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 3, message = "Company name is required."))]
    pub company: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(length(min = 20, message = "Company description must be at least 20 characters."))]
    pub company_description: String,
    #[validate(length(min = 5, message = "Location is required."))]
    pub location: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub instagram_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub facebook_url: Option<String>,
    /// New company logo as a data URI
    #[serde(default, deserialize_with = "empty_as_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RatingForm {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: u8,
}
