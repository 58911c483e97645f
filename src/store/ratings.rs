//! Platform ratings (`community_ratings` table), one row per user

use chrono::Utc;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};

/// Average platform rating and number of votes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let total: u32 = ratings.iter().map(|r| *r as u32).sum();
        Self {
            average: total as f64 / ratings.len() as f64,
            count: ratings.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatingValue {
    rating: u8,
}


/// Rating store operations
#[derive(Clone)]
pub struct RatingStore {
    client: SupabaseClient,
}

impl RatingStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self) -> Result<RatingSummary, SupabaseError> {
        let rows: Vec<RatingValue> = self.client.get("community_ratings", "select=rating").await?;
        let ratings: Vec<u8> = rows.into_iter().map(|r| r.rating).collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }

    /// Record `rating`, replacing the user's earlier vote if there is one
    pub async fn rate(&self, user_id: Uuid, rating: u8) -> Result<(), SupabaseError> {
        let query = format!("user_id=eq.{}&select=id", user_id);
        let existing: Option<IgnoredAny> = self.client.get_one("community_ratings", &query).await?;

        if existing.is_some() {
            #[derive(Serialize)]
            struct RatingUpdate {
                rating: u8,
                updated_at: String,
            }

            self.client
                .update(
                    "community_ratings",
                    &format!("user_id=eq.{}", user_id),
                    &RatingUpdate {
                        rating,
                        updated_at: Utc::now().to_rfc3339(),
                    },
                )
                .await
        } else {
            #[derive(Serialize)]
            struct NewRating {
                user_id: Uuid,
                rating: u8,
            }

            self.client
                .insert::<_, serde_json::Value>("community_ratings", &NewRating { user_id, rating })
                .await
                .map(|_| ())
        }
    }
}
