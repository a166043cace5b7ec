// OAuth callback handler
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::gateway::AuthGateway;
use crate::session::session_cookies;
use crate::settings::AuthrelaySettings;
use crate::utils::responses::{redirect_to, redirect_with_cookies};

/// Query marker appended to the login path when the exchange fails
const OAUTH_ERROR_MARKER: &str = "error=oauth_error";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /auth/callback` — exchange a provider-issued authorization code for
/// a session, then redirect. Renders no content; the only observable
/// effects are the redirect and, on success, the session cookies.
///
/// Without a `code` the request historically fell through to the dashboard;
/// that permissive contract is kept as the default and the route guard
/// decides whether a session actually exists. `callback.require_code`
/// switches to rejecting code-less callbacks at this boundary instead.
pub async fn oauth_callback(
    query: web::Query<CallbackQuery>,
    gateway: web::Data<AuthGateway>,
    settings: web::Data<AuthrelaySettings>,
) -> HttpResponse {
    let query = query.into_inner();
    let login_error = format!("{}?{}", settings.routes.login_path, OAUTH_ERROR_MARKER);

    let Some(code) = query.code else {
        if let Some(error) = &query.error {
            log::warn!(
                "OAuth callback reported an error: {error} ({})",
                query.error_description.as_deref().unwrap_or("no description")
            );
        }
        if settings.callback.require_code {
            return redirect_to(&login_error);
        }
        return redirect_to(&settings.routes.dashboard_path);
    };

    match gateway.exchange_code(&code).await {
        Ok(session) => {
            log::info!("OAuth login successful for user {}", session.identity.id);
            redirect_with_cookies(
                &settings.routes.dashboard_path,
                session_cookies(&session, settings.cookies.secure),
            )
        }
        Err(message) => {
            log::error!("error during OAuth code exchange: {message}");
            redirect_to(&login_error)
        }
    }
}
