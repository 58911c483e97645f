//! AI helpers for listings, appraisal, the chatbot and impact reports.
//!
//! Every helper is a fixed prompt sent to Groq. Helpers that have a canned
//! answer return it when the model gives nothing usable; a missing API key
//! is always an error.

pub mod appraisal;
pub mod assistant;
pub mod client;
pub mod impact;
pub mod listing;

pub use client::{GroqClient, LlmError};

use crate::config::Config;

/// Groq-backed helpers with the models picked in configuration
#[derive(Clone)]
pub struct AiService {
    client: GroqClient,
    text_model: String,
    chat_model: String,
    vision_model: String,
}

impl AiService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: GroqClient::new(config),
            text_model: config.groq_text_model.clone(),
            chat_model: config.groq_chat_model.clone(),
            vision_model: config.groq_vision_model.clone(),
        }
    }
}
