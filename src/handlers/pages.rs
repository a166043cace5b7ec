// Placeholder entry and dashboard views plus the health endpoint
//
// The product's real document and chat surfaces live elsewhere and consume
// only the session state; these pages exist so the route guard has views to
// guard.
use actix_web::HttpResponse;
use serde_json::json;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1>{body}</body></html>"
    )
}

fn html(content: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(content)
}

pub async fn home_page() -> HttpResponse {
    html(page(
        "Welcome",
        r#"<p><a href="/login">Sign in</a> or <a href="/register">create an account</a>.</p>"#,
    ))
}

pub async fn login_page() -> HttpResponse {
    html(page(
        "Sign in",
        r#"<form method="post" action="/auth/login">
<input name="email" type="email" placeholder="Email">
<input name="password" type="password" placeholder="Password">
<button type="submit">Sign in</button>
</form>
<p><a href="/auth/sign_in/google">Continue with Google</a></p>"#,
    ))
}

pub async fn register_page() -> HttpResponse {
    html(page(
        "Create account",
        r#"<form method="post" action="/auth/register">
<input name="name" placeholder="Name">
<input name="email" type="email" placeholder="Email">
<input name="password" type="password" placeholder="Password">
<input name="confirm_password" type="password" placeholder="Confirm password">
<button type="submit">Register</button>
</form>"#,
    ))
}

pub async fn dashboard_page() -> HttpResponse {
    html(page(
        "Dashboard",
        r#"<p>Documents and chat load here.</p>
<form method="post" action="/auth/logout"><button type="submit">Sign out</button></form>"#,
    ))
}

/// Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
