//! Marketplace chatbot

use serde::{Deserialize, Serialize};

use super::client::{ChatMessage, ChatRequest, LlmError};
use super::AiService;
use crate::market::model::Product;

const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";
/// Listings attached to a single reply at most
pub const MAX_REFERENCED_PRODUCTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Turn {
    pub role: Speaker,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub history: Vec<Turn>,
    pub message: String,
    #[serde(default)]
    pub language: Language,
}

fn system_prompt(language: Language, catalog: &[Product]) -> String {
    let mut prompt = String::from(
        "You are REVO, the AI assistant of a B2B circular economy marketplace where \
industrial producers list waste streams and recyclers buy them. Answer questions about the \
listed materials, recycling and how the platform works. Be concise and professional. Prices \
are in INR per ton.",
    );
    if language == Language::Hi {
        prompt.push_str(" Reply in Hindi.");
    }
    if !catalog.is_empty() {
        prompt.push_str("\n\nCurrently available listings:\n");
        for product in catalog {
            prompt.push_str(&format!(
                "- {} ({}), ₹{:.0}/ton: {}\n",
                product.name, product.category, product.price, product.description
            ));
        }
    }
    prompt
}

/// Conversation in wire order: system, history, new message
pub fn build_messages(input: &ChatInput, catalog: &[Product]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(input.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(input.language, catalog)));
    messages.extend(input.history.iter().map(|turn| match turn.role {
        Speaker::Model => ChatMessage::assistant(turn.content.clone()),
        Speaker::User => ChatMessage::user(turn.content.clone()),
    }));
    messages.push(ChatMessage::user(input.message.clone()));
    messages
}

/// Listings the reply mentions by name
pub fn referenced_products<'a>(reply: &str, catalog: &'a [Product]) -> Vec<&'a Product> {
    let reply = reply.to_lowercase();
    catalog
        .iter()
        .filter(|p| !p.is_sold && !p.name.trim().is_empty())
        .filter(|p| reply.contains(&p.name.to_lowercase()))
        .take(MAX_REFERENCED_PRODUCTS)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutput {
    pub response: String,
    pub products: Vec<Product>,
}

impl AiService {
    /// Answer the next user message; `catalog` are the unsold listings the
    /// assistant may talk about
    pub async fn chat(&self, input: &ChatInput, catalog: &[Product]) -> Result<ChatOutput, LlmError> {
        let request = ChatRequest::new(self.chat_model.clone(), build_messages(input, catalog))
            .temperature(0.7);

        let response = self
            .client
            .complete(&request)
            .await?
            .unwrap_or_else(|| EMPTY_REPLY.to_string());
        let products = referenced_products(&response, catalog)
            .into_iter()
            .cloned()
            .collect();

        Ok(ChatOutput { response, products })
    }
}
