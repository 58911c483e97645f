//! Supabase Auth (GoTrue) calls made on behalf of end users

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// Tokens handed back to the browser after sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user_id: Uuid,
}

/// Outcome of a sign-up. `session` is only present when the project
/// auto-confirms email addresses.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub user_id: Uuid,
    pub session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: AuthUser,
}

/// GoTrue answers sign-up with either a bare user or a full session
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Debug, Deserialize)]
struct GoTrueErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Register an email/password account; company details go to user metadata
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        company: &str,
    ) -> Result<SignUp, AuthClientError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": {
                "display_name": display_name,
                "college": company,
                "avatar": null,
            }
        });

        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let parsed: SignUpResponse = check_status(response).await?.json().await?;
        Ok(match parsed {
            SignUpResponse::Session(token) => SignUp {
                user_id: token.user.id,
                session: Some(token.into()),
            },
            SignUpResponse::User(user) => SignUp {
                user_id: user.id,
                session: None,
            },
        })
    }

    /// Password grant
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthClientError> {
        let response = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = check_status(response).await?.json().await?;
        Ok(token.into())
    }

    /// Start an email change for the token's owner; Supabase mails a
    /// confirmation link to the new address
    pub async fn update_email(&self, access_token: &str, email: &str) -> Result<(), AuthClientError> {
        let response = self
            .client
            .put(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            user_id: token.user.id,
        }
    }
}

async fn check_status(response: Response) -> Result<Response, AuthClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoTrueErrorBody>(&raw)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message))
        .unwrap_or(raw);
    Err(AuthClientError::Rejected { status, message })
}

#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}
