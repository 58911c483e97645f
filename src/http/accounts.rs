//! Sign-up, sign-in and the signed-in company's own pages

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::require_profile;
use crate::app::AppState;
use crate::market::catalog::{self, DashboardStats};
use crate::market::certificate::{self, Certificate};
use crate::market::forms::{normalize_phone, LoginForm, ProfileForm, SignupForm};
use crate::market::image::ImageUpload;
use crate::market::model::{Product, User};
use crate::store::auth::Session;
use crate::store::products::ProductFilter;
use crate::store::profiles::{NewProfile, ProfileChanges};
use crate::store::storage::AVATARS_BUCKET;
use crate::util::time::unix_millis;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    user_id: Uuid,
    /// Absent when the account still has to confirm its email
    session: Option<Session>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    if !state.rate_limits.check_auth() {
        return Err(AppError::RateLimited);
    }
    form.validate()?;

    let email = form.email.trim().to_lowercase();
    let name = form.name.trim();
    let company = form.company.trim();

    let created = state
        .auth
        .sign_up(&email, &form.password, name, company)
        .await?;

    state
        .profile_store
        .upsert_signup_profile(&NewProfile {
            id: created.user_id,
            display_name: name.to_string(),
            college: company.to_string(),
            email,
        })
        .await?;

    info!(user_id = %created.user_id, "company signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: created.user_id,
            session: created.session,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<Session>, AppError> {
    if !state.rate_limits.check_auth() {
        return Err(AppError::RateLimited);
    }
    form.validate()?;

    let session = state
        .auth
        .sign_in(form.email.trim(), &form.password)
        .await?;
    info!(user_id = %session.user_id, "company signed in");
    Ok(Json(session))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(require_profile(&state, auth.user_id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<User>, AppError> {
    form.validate()?;
    let logo = form
        .logo
        .as_deref()
        .map(ImageUpload::from_data_uri)
        .transpose()?;
    let current = require_profile(&state, auth.user_id).await?;

    // the token carries the confirmed address; a pending change can be re-sent
    let email = form.email.trim().to_lowercase();
    let confirmed = auth
        .claims
        .email
        .as_deref()
        .unwrap_or(current.email.as_str());
    let email_changed = !email.eq_ignore_ascii_case(confirmed.trim());

    let avatar = match logo {
        Some(image) => {
            let path = image.object_name(auth.user_id, unix_millis());
            Some(
                state
                    .storage
                    .upload(AVATARS_BUCKET, &path, image.data, image.mime_type)
                    .await?,
            )
        }
        None => None,
    };

    let changes = ProfileChanges {
        display_name: form.name.trim().to_string(),
        college: form.company.trim().to_string(),
        phone_number: normalize_phone(&form.phone),
        company_description: form.company_description.trim().to_string(),
        location: form.location.trim().to_string(),
        instagram_url: form.instagram_url.clone(),
        facebook_url: form.facebook_url.clone(),
        avatar: avatar.clone(),
    };

    let result = match state
        .profile_store
        .update_profile(auth.user_id, &changes)
        .await
    {
        Ok(Some(updated)) => Ok(updated),
        Ok(None) => Err(AppError::NotFound("Profile not found".to_string())),
        Err(e) => Err(AppError::from(e)),
    };

    let stale = match (&result, &avatar) {
        (Ok(_), Some(_)) => current.avatar.as_deref(),
        (Err(_), Some(uploaded)) => Some(uploaded.as_str()),
        (_, None) => None,
    };
    if let Some(url) = stale {
        state.storage.remove_by_url(AVATARS_BUCKET, url).await;
    }
    let updated = result?;

    if email_changed {
        state.auth.update_email(&auth.access_token, &email).await?;
        info!(user_id = %auth.user_id, "email change requested");
    }

    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    user: User,
    stats: DashboardStats,
    products: Vec<Product>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardResponse>, AppError> {
    let filter = ProductFilter {
        seller_id: Some(auth.user_id),
    };
    let (user, products) = futures::try_join!(
        require_profile(&state, auth.user_id),
        async { state.product_store.list(&filter).await.map_err(AppError::from) },
    )?;

    let stats = catalog::dashboard_stats(&user, &products);
    Ok(Json(DashboardResponse {
        user,
        stats,
        products,
    }))
}

pub async fn get_certificate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Certificate>, AppError> {
    let user = require_profile(&state, auth.user_id).await?;
    let issued = certificate::issue(&user, chrono::Utc::now()).map_err(|e| {
        warn!(user_id = %auth.user_id, "certificate requested with incomplete profile");
        e
    })?;
    Ok(Json(issued))
}

#[cfg(test)]
mod tests {
    use crate::http::middleware::test_tokens::sign;
    use crate::http::test_support::{
        app, png_data_uri, profile_json, send, send_with_token, stored_url, JWT_SECRET,
    };
    use axum::http::StatusCode;
    use mockito::{Matcher, Server, ServerGuard};
    use uuid::Uuid;

    const USER: Uuid = Uuid::from_u128(7);

    fn profile_form(email: &str, logo: Option<String>) -> serde_json::Value {
        serde_json::json!({
            "name": "Asha",
            "email": email,
            "company": "Asha Polymers",
            "phone": "9876543210",
            "companyDescription": "Post-industrial plastic recycler in Pune",
            "location": "Pune, Maharashtra",
            "logo": logo
        })
    }

    async fn mock_profile(server: &mut ServerGuard, email: &str, avatar: Option<&str>) {
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(profile_json(USER, email, avatar).to_string())
            .create_async()
            .await;
    }

    async fn mock_email_change(server: &mut ServerGuard, expected: usize) -> mockito::Mock {
        server
            .mock("PUT", "/auth/v1/user")
            .match_body(Matcher::Json(serde_json::json!({ "email": "new@acme.in" })))
            .with_status(200)
            .with_body("{}")
            .expect(expected)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn bad_logo_is_rejected_before_email_change() {
        let mut server = Server::new_async().await;
        mock_profile(&mut server, "asha@example.com", None).await;
        let email_change = mock_email_change(&mut server, 0).await;

        let (status, _) = send(
            app(&server),
            "PUT",
            "/me",
            Some(USER),
            Some(profile_form("new@acme.in", Some("data:image/gif;base64,R0lG".into()))),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        email_change.assert_async().await;
    }

    #[tokio::test]
    async fn failed_profile_save_removes_new_logo() {
        let mut server = Server::new_async().await;
        mock_profile(&mut server, "asha@example.com", None).await;
        server
            .mock(
                "POST",
                Matcher::Regex(format!(r"^/storage/v1/object/avatars/{}/\d+\.png$", USER)),
            )
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("PATCH", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"message":"update failed"}"#)
            .create_async()
            .await;
        let cleanup = server
            .mock("DELETE", "/storage/v1/object/avatars")
            .match_body(Matcher::Regex(format!(r#""prefixes":\["{}/\d+\.png"\]"#, USER)))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let email_change = mock_email_change(&mut server, 0).await;

        let (status, _) = send(
            app(&server),
            "PUT",
            "/me",
            Some(USER),
            Some(profile_form("new@acme.in", Some(png_data_uri()))),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        cleanup.assert_async().await;
        email_change.assert_async().await;
    }

    #[tokio::test]
    async fn new_logo_replaces_old_and_email_goes_to_auth() {
        let mut server = Server::new_async().await;
        let old_logo = stored_url(&server, "avatars", &format!("{}/old.png", USER));
        mock_profile(&mut server, "asha@example.com", Some(old_logo.as_str())).await;
        server
            .mock(
                "POST",
                Matcher::Regex(format!(r"^/storage/v1/object/avatars/{}/\d+\.png$", USER)),
            )
            .with_status(200)
            .create_async()
            .await;
        let save = server
            .mock("PATCH", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("id".into(), format!("eq.{}", USER)))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "display_name": "Asha",
                "phone_number": "+919876543210"
            })))
            .with_status(200)
            .with_body(serde_json::json!([profile_json(USER, "asha@example.com", None)]).to_string())
            .expect(1)
            .create_async()
            .await;
        let remove_old = server
            .mock("DELETE", "/storage/v1/object/avatars")
            .match_body(Matcher::Json(serde_json::json!({
                "prefixes": [format!("{}/old.png", USER)]
            })))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let email_change = mock_email_change(&mut server, 1).await;

        let (status, body) = send(
            app(&server),
            "PUT",
            "/me",
            Some(USER),
            Some(profile_form("New@Acme.in", Some(png_data_uri()))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // the row keeps the confirmed address until the change is confirmed
        assert_eq!(body["email"], "asha@example.com");
        save.assert_async().await;
        remove_old.assert_async().await;
        email_change.assert_async().await;
    }

    #[tokio::test]
    async fn confirmed_address_comes_from_the_token() {
        let mut server = Server::new_async().await;
        // profile row still shows the address from before the confirmed change
        mock_profile(&mut server, "asha@example.com", None).await;
        server
            .mock("PATCH", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(serde_json::json!([profile_json(USER, "asha@example.com", None)]).to_string())
            .create_async()
            .await;
        let email_change = mock_email_change(&mut server, 0).await;

        let token = sign(
            &serde_json::json!({
                "sub": USER,
                "aud": "authenticated",
                "exp": chrono::Utc::now().timestamp() + 3600,
                "email": "new@acme.in"
            }),
            JWT_SECRET,
        );
        let (status, _) = send_with_token(
            app(&server),
            "PUT",
            "/me",
            Some(token),
            Some(profile_form("new@acme.in", None)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        email_change.assert_async().await;
    }
}
