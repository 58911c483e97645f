//! Company profiles (`profiles` table)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};
use crate::market::model::User;

/// Raw profile row. The company name lives in the legacy `college` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
}

impl From<ProfileRow> for User {
    fn from(row: ProfileRow) -> Self {
        User {
            id: row.id,
            name: non_empty(row.display_name).unwrap_or_else(|| "Unknown User".to_string()),
            email: row.email.unwrap_or_default(),
            company: non_empty(row.college).unwrap_or_else(|| "Some Company".to_string()),
            phone: row.phone_number,
            avatar: non_empty(row.avatar),
            is_admin: row.role.as_deref() == Some("admin"),
            company_description: row.company_description,
            location: row.location,
            instagram_url: row.instagram_url,
            facebook_url: row.facebook_url,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Profile written right after sign-up
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub display_name: String,
    pub college: String,
    pub email: String,
}

/// Profile update. Social links serialize as `null` so they can be cleared.
/// The email column is left alone: address changes go through Supabase Auth
/// and only take effect once confirmed.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChanges {
    pub display_name: String,
    pub college: String,
    pub phone_number: String,
    pub company_description: String,
    pub location: String,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Profile store operations
#[derive(Clone)]
pub struct ProfileStore {
    client: SupabaseClient,
}

impl ProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// All registered companies
    pub async fn list_users(&self) -> Result<Vec<User>, SupabaseError> {
        let rows: Vec<ProfileRow> = self.client.get("profiles", "select=*").await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get a user profile by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, SupabaseError> {
        let query = format!("id=eq.{}&select=*", user_id);
        let row: Option<ProfileRow> = self.client.get_one("profiles", &query).await?;
        Ok(row.map(User::from))
    }

    /// Create or refresh the profile that belongs to a fresh auth user
    pub async fn upsert_signup_profile(&self, profile: &NewProfile) -> Result<(), SupabaseError> {
        self.client.upsert("profiles", profile, "id").await
    }

    /// Update a user profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, SupabaseError> {
        let query = format!("id=eq.{}", user_id);
        let rows: Vec<ProfileRow> = self
            .client
            .update_returning("profiles", &query, changes)
            .await?;
        Ok(rows.into_iter().next().map(User::from))
    }
}
