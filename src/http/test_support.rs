//! Helpers for driving the router against a mockito Supabase

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use mockito::Server;
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use super::middleware::test_tokens::user_token;
use crate::app::AppState;
use crate::config::Config;

pub const JWT_SECRET: &str = "jwt-secret";

pub fn app(server: &Server) -> Router {
    build_router(AppState::new(Config::for_tests(&server.url())))
}

/// Send a request as `user` (or anonymously) and return status and JSON body
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let token = user.map(|user_id| user_token(user_id, JWT_SECRET));
    send_with_token(app, method, uri, token, body).await
}

/// Like [`send`] with a caller-made bearer token
pub async fn send_with_token(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<String>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => request
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// A tiny PNG payload as the browser would send it
pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(b"png-bytes"))
}

/// Public URL of an object in this project's storage
pub fn stored_url(server: &Server, bucket: &str, path: &str) -> String {
    format!("{}/storage/v1/object/public/{}/{}", server.url(), bucket, path)
}

pub fn profile_json(id: Uuid, email: &str, avatar: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "display_name": "Asha",
        "college": "Asha Polymers",
        "email": email,
        "phone_number": "+919876543210",
        "avatar": avatar,
        "role": "user"
    })
}

pub fn listing_json(
    id: Uuid,
    seller: Uuid,
    name: &str,
    image_url: Option<&str>,
    status: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "seller_id": seller,
        "product_name": name,
        "description": "Washed and baled, ready for pickup",
        "price": 18000,
        "category": "Plastics",
        "image_url": image_url,
        "seller_name": "Asha",
        "whatsapp_number": "+919876543210",
        "status": status,
        "created_at": "2026-05-01T08:00:00+00:00"
    })
}
