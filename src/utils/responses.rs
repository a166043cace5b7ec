//! HTTP response helpers
//!
//! Small, consistent builders for the redirect-heavy parts of the auth flow.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::HttpResponse;

/// 302 redirect to the given location
#[must_use]
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// 302 redirect carrying one or more Set-Cookie headers
#[must_use]
pub fn redirect_with_cookies(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
    let mut builder = HttpResponse::Found();
    for cookie in cookies {
        builder.cookie(cookie);
    }
    builder
        .append_header((header::LOCATION, location))
        .finish()
}
