//! End-to-end handler tests against the scriptable mock provider.
//!
//! Run with: cargo test --features testing

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{middleware, test, web, App};
use serde_json::{json, Value};

use authrelay::gateway::AuthGateway;
use authrelay::guard::{session_guard, RoutePolicy};
use authrelay::handlers::configure_routes;
use authrelay::provider::IdentityProvider;
use authrelay::session::SessionContext;
use authrelay::settings::AuthrelaySettings;
use authrelay::testing::{test_identity, MockProvider};

fn test_settings() -> AuthrelaySettings {
    let mut settings = AuthrelaySettings::default();
    settings.application.redirect_base_url = "https://app.example.com".to_string();
    settings.cookies.secure = false;
    settings
}

/// Build the full application (guard, routes, state) around a mock provider.
macro_rules! test_app {
    ($mock:expr, $settings:expr) => {{
        let settings = $settings;
        let provider: Arc<dyn IdentityProvider> = Arc::clone(&$mock) as Arc<dyn IdentityProvider>;
        let gateway = Arc::new(AuthGateway::new(
            provider,
            settings.application.redirect_base_url.clone(),
        ));
        let context = SessionContext::start(Arc::clone(&gateway));
        test::init_service(
            App::new()
                .app_data(web::Data::from(gateway))
                .app_data(web::Data::from(context))
                .app_data(web::Data::new(RoutePolicy::from_settings(&settings)))
                .app_data(web::Data::new(settings))
                .wrap(middleware::from_fn(session_guard))
                .configure(configure_routes),
        )
        .await
    }};
}

fn location(response: &actix_web::dev::ServiceResponse) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn set_cookie_names(response: &actix_web::dev::ServiceResponse) -> Vec<String> {
    response
        .response()
        .cookies()
        .map(|cookie| cookie.name().to_string())
        .collect()
}

// --- OAuth callback ---

#[actix_web::test]
async fn callback_without_code_redirects_to_dashboard_without_exchange() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/auth/callback").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/dashboard");
    assert!(!mock
        .recorded_calls()
        .contains(&"exchange_code_for_session"));
}

#[actix_web::test]
async fn callback_without_code_redirects_to_login_in_strict_mode() {
    let mock = Arc::new(MockProvider::new());
    let mut settings = test_settings();
    settings.callback.require_code = true;
    let app = test_app!(mock, settings);

    let request = test::TestRequest::get().uri("/auth/callback").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=oauth_error");
}

#[actix_web::test]
async fn callback_with_valid_code_sets_cookies_and_redirects() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get()
        .uri("/auth/callback?code=valid-code")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/dashboard");
    let cookies = set_cookie_names(&response);
    assert!(cookies.contains(&"ar_access_token".to_string()));
    assert!(cookies.contains(&"ar_refresh_token".to_string()));
    assert!(mock
        .recorded_calls()
        .contains(&"exchange_code_for_session"));
}

#[actix_web::test]
async fn callback_with_rejected_code_redirects_to_login_with_error() {
    let mock = Arc::new(MockProvider::new().with_exchange_error("invalid authorization code"));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get()
        .uri("/auth/callback?code=expired-code")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=oauth_error");
    assert!(set_cookie_names(&response).is_empty());
}

// --- Password login ---

#[actix_web::test]
async fn login_success_returns_identity_and_session_cookies() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "jane.doe@example.com", "password": "pw123456" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookie_names(&response);
    assert!(cookies.contains(&"ar_access_token".to_string()));

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["identity"]["id"], test_identity().id);
    assert_eq!(body["error"], Value::Null);
}

#[actix_web::test]
async fn login_failure_surfaces_provider_message_verbatim() {
    let mock = Arc::new(MockProvider::new().with_login_error("Invalid credentials"));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "jane.doe@example.com", "password": "wrong" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_names(&response).is_empty());

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
    assert_eq!(body["identity"], Value::Null);
}

// --- Registration ---

#[actix_web::test]
async fn register_rejects_password_mismatch_before_any_provider_call() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "new@example.com",
            "password": "pw123456",
            "confirm_password": "pw654321",
            "name": "New User"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!mock.recorded_calls().contains(&"sign_up"));

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Passwords do not match");
}

#[actix_web::test]
async fn register_rejects_short_password_before_any_provider_call() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "new@example.com",
            "password": "pw123",
            "confirm_password": "pw123",
            "name": "New User"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!mock.recorded_calls().contains(&"sign_up"));

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[actix_web::test]
async fn register_success_reports_the_new_identity() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "new@example.com",
            "password": "pw123456",
            "confirm_password": "pw123456",
            "name": "New User"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["identity"]["email"], "new@example.com");
    assert_eq!(
        mock.last_signup_metadata().and_then(|m| m.name),
        Some("New User".to_string())
    );
}

// --- Logout ---

#[actix_web::test]
async fn logout_expires_session_cookies() {
    let mock = Arc::new(MockProvider::new().with_user(Some(test_identity())));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post().uri("/auth/logout").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let expired: Vec<_> = response
        .response()
        .cookies()
        .filter(|cookie| cookie.value().is_empty())
        .map(|cookie| cookie.name().to_string())
        .collect();
    assert!(expired.contains(&"ar_access_token".to_string()));
    assert!(expired.contains(&"ar_refresh_token".to_string()));
}

#[actix_web::test]
async fn failed_logout_reports_the_provider_message() {
    let mock = Arc::new(
        MockProvider::new()
            .with_user(Some(test_identity()))
            .with_sign_out_error("Sign-out rejected"),
    );
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::post().uri("/auth/logout").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Sign-out rejected");
}

// --- Current user ---

#[actix_web::test]
async fn current_user_reports_null_when_anonymous() {
    let mock = Arc::new(MockProvider::new().with_user(None));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/auth/user").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["identity"], Value::Null);
    assert_eq!(body["error"], Value::Null);
}

// --- Google OAuth initiation ---

#[actix_web::test]
async fn google_sign_in_redirects_to_the_authorization_url() {
    let mock = Arc::new(MockProvider::new());
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get()
        .uri("/auth/sign_in/google")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).contains("provider=google"));
    assert_eq!(
        mock.last_oauth_redirect().as_deref(),
        Some("https://app.example.com/auth/callback")
    );
}

#[actix_web::test]
async fn google_sign_in_failure_lands_back_on_login() {
    let mock = Arc::new(MockProvider::new().with_oauth_error("provider not enabled"));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get()
        .uri("/auth/sign_in/google")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=oauth_config");
}

// --- Route guard ---

#[actix_web::test]
async fn guard_redirects_anonymous_visitors_away_from_the_dashboard() {
    let mock = Arc::new(MockProvider::new().with_user(None));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/dashboard").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[actix_web::test]
async fn guard_redirects_authenticated_visitors_away_from_entry_views() {
    let mock = Arc::new(MockProvider::new().with_user(Some(test_identity())));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/login").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/dashboard");
}

#[actix_web::test]
async fn guard_serves_protected_views_to_authenticated_visitors() {
    let mock = Arc::new(MockProvider::new().with_user(Some(test_identity())));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/dashboard").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn guard_leaves_public_paths_alone() {
    let mock = Arc::new(MockProvider::new().with_user(None));
    let app = test_app!(mock, test_settings());

    let request = test::TestRequest::get().uri("/ping").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "ok");
}
