//! Session cookie issuance for the HTTP boundary
//!
//! The provider session is mirrored into `HttpOnly` cookies so subsequent
//! requests can carry the established session. Cookie values are the
//! provider-issued tokens; the provider validates them on every use.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use chrono::Utc;

use crate::models::ProviderSession;

pub const ACCESS_TOKEN_COOKIE: &str = "ar_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "ar_refresh_token";

/// Refresh tokens outlive the access token by design
const REFRESH_COOKIE_DAYS: i64 = 7;

fn build_cookie(
    name: &'static str,
    value: String,
    secure: bool,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

/// Cookies mirroring an established provider session
#[must_use]
pub fn session_cookies(session: &ProviderSession, secure: bool) -> Vec<Cookie<'static>> {
    let remaining = (session.expires_at - Utc::now()).num_seconds().max(0);
    let mut cookies = vec![build_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.clone(),
        secure,
        Duration::seconds(remaining),
    )];
    if let Some(refresh_token) = &session.refresh_token {
        cookies.push(build_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token.clone(),
            secure,
            Duration::days(REFRESH_COOKIE_DAYS),
        ));
    }
    cookies
}

/// Expired cookies that clear any previously issued session
#[must_use]
pub fn expired_cookies(secure: bool) -> Vec<Cookie<'static>> {
    vec![
        build_cookie(ACCESS_TOKEN_COOKIE, String::new(), secure, Duration::ZERO),
        build_cookie(REFRESH_TOKEN_COOKIE, String::new(), secure, Duration::ZERO),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, IdentityMetadata};
    use chrono::Duration as ChronoDuration;

    fn session(refresh: Option<&str>) -> ProviderSession {
        ProviderSession {
            access_token: "access-token".to_string(),
            refresh_token: refresh.map(ToString::to_string),
            expires_at: Utc::now() + ChronoDuration::hours(1),
            identity: Identity {
                id: "u1".to_string(),
                email: None,
                metadata: IdentityMetadata::default(),
            },
        }
    }

    #[test]
    fn cookies_carry_tokens_with_secure_attributes() {
        let cookies = session_cookies(&session(Some("refresh-token")), true);
        assert_eq!(cookies.len(), 2);

        let access = &cookies[0];
        assert_eq!(access.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(access.value(), "access-token");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));

        assert_eq!(cookies[1].name(), REFRESH_TOKEN_COOKIE);
        assert_eq!(cookies[1].value(), "refresh-token");
    }

    #[test]
    fn refresh_cookie_is_omitted_when_provider_sent_none() {
        let cookies = session_cookies(&session(None), false);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].secure(), Some(false));
    }

    #[test]
    fn expired_cookies_clear_both_names() {
        let cookies = expired_cookies(true);
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert!(cookie.value().is_empty());
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
