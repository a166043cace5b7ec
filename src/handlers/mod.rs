// HTTP request handlers for the auth gateway
pub mod auth;
pub mod callback;
pub mod pages;

// Re-export the main handler functions
pub use auth::{
    current_user, google_sign_in, login, logout, register, reset_password, update_profile,
};
pub use callback::oauth_callback;
pub use pages::{dashboard_page, health, home_page, login_page, register_page};

use actix_web::web;

/// Route table shared by the server binary and the integration tests
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth API endpoints
        .route("/auth/login", web::post().to(login))
        .route("/auth/register", web::post().to(register))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/user", web::get().to(current_user))
        .route("/auth/reset_password", web::post().to(reset_password))
        .route("/auth/profile", web::put().to(update_profile))
        // Redirect-based OAuth flow
        .route("/auth/sign_in/google", web::get().to(google_sign_in))
        .route("/auth/callback", web::get().to(oauth_callback))
        // Entry and protected views (placeholder pages; the route guard
        // drives navigation)
        .route("/", web::get().to(home_page))
        .route("/login", web::get().to(login_page))
        .route("/register", web::get().to(register_page))
        .route("/dashboard", web::get().to(dashboard_page))
        // Health endpoint
        .route("/ping", web::get().to(health));
}
