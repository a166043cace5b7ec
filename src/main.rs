#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, middleware::Logger, web, App, HttpServer};
use authrelay::{
    gateway::AuthGateway,
    guard::{session_guard, RoutePolicy},
    handlers::configure_routes,
    provider::{GoTrueProvider, IdentityProvider},
    session::SessionContext,
    settings::AuthrelaySettings,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables.
    // This also loads the .env file and initializes the logger.
    let settings = AuthrelaySettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let provider = GoTrueProvider::from_settings(&settings)
        .map_err(|e| std::io::Error::other(format!("Failed to configure provider: {e}")))?;
    let provider: Arc<dyn IdentityProvider> = Arc::new(provider);

    let gateway = Arc::new(AuthGateway::new(
        provider,
        settings.application.redirect_base_url.clone(),
    ));
    start_server(gateway, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(gateway: Arc<AuthGateway>, settings: AuthrelaySettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    // The session context owns the store; it registers the push listener
    // and kicks off the initial identity fetch.
    let session_context = SessionContext::start(Arc::clone(&gateway));
    let route_policy = RoutePolicy::from_settings(&settings);

    // Configure CORS for browser clients
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::from(Arc::clone(&gateway)))
            .app_data(web::Data::from(Arc::clone(&session_context)))
            .app_data(web::Data::new(route_policy.clone()))
            .app_data(web::Data::new(settings.clone()))
            .wrap(middleware::from_fn(session_guard))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &AuthrelaySettings) {
    println!("Starting Authrelay session gateway on http://{bind_address}");
    println!();
    println!("Auth endpoints:");
    println!("  POST /auth/login          - Email/password sign-in");
    println!("  POST /auth/register       - Create an account");
    println!("  POST /auth/logout         - Terminate the session");
    println!("  GET  /auth/user           - Current identity (null when anonymous)");
    println!("  POST /auth/reset_password - Send a password-reset email");
    println!("  PUT  /auth/profile        - Update profile metadata");
    println!("  GET  /auth/sign_in/google - Redirect-based Google OAuth");
    println!("  GET  /auth/callback       - OAuth callback (code exchange)");
    println!();
    println!("OAuth callback URL for the identity provider:");
    println!(
        "  {}/auth/callback",
        settings.application.redirect_base_url
    );
    println!();
    println!("System endpoints:");
    println!("  GET  /ping                - Health check");
}
