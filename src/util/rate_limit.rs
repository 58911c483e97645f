//! Rate limiting utilities

use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per minute
pub fn create_limiter(requests_per_minute: u32) -> Arc<Limiter> {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// AI helper calls per user
pub const AI_RATE_LIMIT: u32 = 20; // Max 20 AI requests per minute

/// Sign-up / sign-in attempts across all clients
pub const AUTH_RATE_LIMIT: u32 = 60; // Max 60 auth attempts per minute

/// Per-user limiters for the AI endpoints plus a shared one for auth
#[derive(Clone)]
pub struct RateLimits {
    ai: Arc<DashMap<Uuid, Arc<Limiter>>>,
    ai_per_minute: u32,
    auth: Arc<Limiter>,
}

impl RateLimits {
    pub fn new(ai_per_minute: u32, auth_per_minute: u32) -> Self {
        Self {
            ai: Arc::new(DashMap::new()),
            ai_per_minute,
            auth: create_limiter(auth_per_minute),
        }
    }

    /// Check if an AI request from `user_id` is allowed (returns true if allowed)
    pub fn check_ai(&self, user_id: Uuid) -> bool {
        let limiter = self
            .ai
            .entry(user_id)
            .or_insert_with(|| create_limiter(self.ai_per_minute))
            .clone();
        limiter.check().is_ok()
    }

    /// Check if another auth attempt is allowed
    pub fn check_auth(&self) -> bool {
        self.auth.check().is_ok()
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new(AI_RATE_LIMIT, AUTH_RATE_LIMIT)
    }
}
