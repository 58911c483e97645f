//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Default Groq endpoint (OpenAI-compatible)
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Upper bound for a single request, including upstream calls
    pub request_timeout: Duration,

    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase anonymous key (used for GoTrue sign-up/sign-in)
    pub supabase_anon_key: String,
    /// Supabase service role key (bypasses RLS - server only!)
    pub supabase_service_role_key: String,
    /// Supabase JWT secret for token verification
    pub supabase_jwt_secret: String,

    /// Groq API key. Absent keys only fail when an AI endpoint is hit.
    pub groq_api_key: Option<String>,
    /// Groq API base URL
    pub groq_base_url: String,
    /// Model for short text generation (impact reports, categories)
    pub groq_text_model: String,
    /// Model for the chatbot
    pub groq_chat_model: String,
    /// Model for image-grounded prompts
    pub groq_vision_model: String,

    /// Allowed client origin for CORS
    pub client_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
            Err(_) => 30,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(request_timeout),

            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            supabase_jwt_secret: required("SUPABASE_JWT_SECRET")?,

            groq_api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            groq_base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            groq_text_model: env::var("GROQ_TEXT_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            groq_chat_model: env::var("GROQ_CHAT_MODEL")
                .unwrap_or_else(|_| "gemma-7b-it".to_string()),
            groq_vision_model: env::var("GROQ_VISION_MODEL")
                .unwrap_or_else(|_| "llama-3.2-11b-vision-preview".to_string()),

            client_origin: required("CLIENT_ORIGIN")?,
        })
    }

    /// Configuration pointing every upstream at `base_url`, for tests
    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "debug".to_string(),
            request_timeout: Duration::from_secs(5),
            supabase_url: base_url.to_string(),
            supabase_anon_key: "anon-key".to_string(),
            supabase_service_role_key: "service-key".to_string(),
            supabase_jwt_secret: "jwt-secret".to_string(),
            groq_api_key: Some("groq-key".to_string()),
            groq_base_url: base_url.to_string(),
            groq_text_model: "text-model".to_string(),
            groq_chat_model: "chat-model".to_string(),
            groq_vision_model: "vision-model".to_string(),
            client_origin: "http://localhost:3000".to_string(),
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
