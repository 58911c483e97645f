//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, Method},
    middleware,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{accounts, admin, ai, community, products};
use crate::app::AppState;
use crate::http::middleware::require_auth;
use crate::market::model::PRODUCT_CATEGORIES;
use crate::util::time::uptime_secs;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/categories", get(categories_handler))
        .route("/auth/signup", post(accounts::signup))
        .route("/auth/login", post(accounts::login))
        .route("/products", get(products::list_products))
        .route("/products/featured", get(products::featured_products))
        .route("/products/:id", get(products::get_product))
        .route("/products/:id/similar", get(products::similar_products))
        .route("/sellers/top", get(community::top_sellers))
        .route("/sellers/:id", get(community::seller_page))
        .route("/community/rating", get(community::rating_summary))
        .route("/analytics/diversion", get(community::diversion))
        .route("/analytics/impact", get(community::impact));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(accounts::get_me).put(accounts::update_me))
        .route("/dashboard", get(accounts::dashboard))
        .route("/certificate", get(accounts::get_certificate))
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/products/:id/status", patch(products::update_status))
        .route("/community/rating", post(community::rate_platform))
        .route("/ai/describe", post(ai::describe))
        .route("/ai/appraise", post(ai::appraise))
        .route("/ai/category", post(ai::suggest_category))
        .route("/ai/chat", post(ai::chat))
        .route("/admin/overview", get(admin::overview))
        .route("/admin/products/:id", delete(admin::remove_product))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let request_timeout = state.config.request_timeout;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health and reference data
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    ai_enabled: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        ai_enabled: state.config.groq_api_key.is_some(),
    })
}

async fn categories_handler() -> Json<&'static [&'static str]> {
    Json(PRODUCT_CATEGORIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::middleware::test_tokens::user_token;
    use crate::http::test_support::app;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use mockito::{Matcher, Server};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn product_row(id: u128, name: &str, category: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": Uuid::from_u128(id),
            "seller_id": Uuid::from_u128(7),
            "product_name": name,
            "description": "Baled and ready for pickup",
            "price": 15000,
            "category": category,
            "image_url": null,
            "status": status,
            "created_at": "2026-05-01T08:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn health_and_categories_are_public() {
        let server = Server::new_async().await;
        let app = app(&server);

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = app
            .oneshot(Request::get("/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let categories = body_json(response).await;
        assert_eq!(categories.as_array().unwrap().len(), PRODUCT_CATEGORIES.len());
    }

    #[tokio::test]
    async fn browse_filters_by_category() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/v1/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                serde_json::json!([
                    product_row(1, "PET Bottles", "Plastics", "available"),
                    product_row(2, "Aluminium Cans", "Metals & Scrap", "available")
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let response = app(&server)
            .oneshot(
                Request::get("/products?category=Plastics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let found = body_json(response).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["name"], "PET Bottles");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let server = Server::new_async().await;
        let response = app(&server)
            .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_listing_is_rejected_before_upload() {
        let server = Server::new_async().await;
        let token = user_token(Uuid::from_u128(7), "jwt-secret");
        let body = serde_json::json!({
            "name": "PE",
            "description": "short",
            "price": 0,
            "category": "Uranium",
            "whatsappNumber": "12345"
        });

        let response = app(&server)
            .oneshot(
                Request::post("/products")
                    .header("Authorization", format!("Bearer {}", token))
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let errors = body_json(response).await;
        for field in ["name", "description", "price", "category", "whatsappNumber"] {
            assert!(errors["fields"].get(field).is_some(), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn admin_routes_reject_regular_users() {
        let mut server = Server::new_async().await;
        let user_id = Uuid::from_u128(7);
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "id": user_id,
                    "display_name": "Asha",
                    "college": "Asha Polymers",
                    "role": "user"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let response = app(&server)
            .oneshot(
                Request::get("/admin/overview")
                    .header(
                        "Authorization",
                        format!("Bearer {}", user_token(user_id, "jwt-secret")),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
