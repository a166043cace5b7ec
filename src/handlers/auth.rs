// Authentication handlers: credential sign-in, registration and account ops
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::gateway::AuthGateway;
use crate::models::{AuthResult, LoginCredentials, ProfileUpdate, RegisterData};
use crate::session::{expired_cookies, session_cookies, SessionContext};
use crate::settings::AuthrelaySettings;
use crate::utils::responses::redirect_to;

/// Minimum password length enforced before any provider call
pub const MIN_PASSWORD_LENGTH: usize = 6;

const PASSWORD_MISMATCH: &str = "Passwords do not match";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Password login. Provider-reported failures come back as the provider's
/// own message; the session cookies are only issued on success.
pub async fn login(
    payload: web::Json<LoginCredentials>,
    gateway: web::Data<AuthGateway>,
    settings: web::Data<AuthrelaySettings>,
) -> HttpResponse {
    let credentials = payload.into_inner();
    let result = gateway.login(&credentials.email, &credentials.password).await;
    if !result.is_success() {
        return HttpResponse::Unauthorized().json(result);
    }

    let mut builder = HttpResponse::Ok();
    if let Some(session) = gateway.current_session() {
        for cookie in session_cookies(&session, settings.cookies.secure) {
            builder.cookie(cookie);
        }
    }
    builder.json(result)
}

/// Registration. Confirmation and length checks are rejected here, before
/// the gateway is ever invoked.
pub async fn register(
    payload: web::Json<RegisterRequest>,
    gateway: web::Data<AuthGateway>,
    settings: web::Data<AuthrelaySettings>,
) -> HttpResponse {
    let request = payload.into_inner();
    if request.password != request.confirm_password {
        return HttpResponse::BadRequest().json(AuthResult::err(PASSWORD_MISMATCH));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return HttpResponse::BadRequest().json(AuthResult::err(PASSWORD_TOO_SHORT));
    }

    let data = RegisterData {
        email: request.email,
        password: request.password,
        name: request.name,
    };
    let result = gateway.register(&data).await;
    if !result.is_success() {
        return HttpResponse::BadRequest().json(result);
    }

    let mut builder = HttpResponse::Ok();
    // A session only exists when the provider skips email confirmation
    if let Some(session) = gateway.current_session() {
        for cookie in session_cookies(&session, settings.cookies.secure) {
            builder.cookie(cookie);
        }
    }
    builder.json(result)
}

/// Logout. The session store is cleared locally only on provider success.
pub async fn logout(
    context: web::Data<SessionContext>,
    settings: web::Data<AuthrelaySettings>,
) -> HttpResponse {
    match context.logout().await {
        Ok(()) => {
            let mut builder = HttpResponse::Ok();
            for cookie in expired_cookies(settings.cookies.secure) {
                builder.cookie(cookie);
            }
            builder.json(AuthResult::void())
        }
        Err(message) => HttpResponse::BadGateway().json(AuthResult::err(message)),
    }
}

/// Current identity, or `null` when anonymous. Never an error response.
pub async fn current_user(gateway: web::Data<AuthGateway>) -> HttpResponse {
    let identity = gateway.get_current_user().await;
    HttpResponse::Ok().json(AuthResult {
        identity,
        error: None,
    })
}

/// Initiate the redirect-based Google OAuth flow. On initiation failure the
/// browser lands back on the login page with an error marker; the message
/// itself stays in the logs.
pub async fn google_sign_in(
    gateway: web::Data<AuthGateway>,
    settings: web::Data<AuthrelaySettings>,
) -> HttpResponse {
    match gateway.sign_in_with_google().await {
        Ok(authorization_url) => {
            log::info!("redirecting to google OAuth");
            redirect_to(&authorization_url)
        }
        Err(message) => {
            log::error!("failed to initiate google OAuth: {message}");
            redirect_to(&format!(
                "{}?error=oauth_config",
                settings.routes.login_path
            ))
        }
    }
}

/// Request a password-reset email
pub async fn reset_password(
    payload: web::Json<ResetPasswordRequest>,
    gateway: web::Data<AuthGateway>,
) -> HttpResponse {
    match gateway.reset_password(&payload.email).await {
        Ok(()) => HttpResponse::Ok().json(AuthResult::void()),
        Err(message) => HttpResponse::BadRequest().json(AuthResult::err(message)),
    }
}

/// Merge profile fields into the identity metadata
pub async fn update_profile(
    payload: web::Json<ProfileUpdate>,
    gateway: web::Data<AuthGateway>,
) -> HttpResponse {
    match gateway.update_profile(&payload).await {
        Ok(()) => HttpResponse::Ok().json(AuthResult::void()),
        Err(message) => HttpResponse::BadRequest().json(AuthResult::err(message)),
    }
}
