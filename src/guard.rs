//! Route guard — session-aware navigation control
//!
//! A read-only observer of the session store. Once the store has resolved,
//! anonymous visitors are redirected away from protected views and
//! authenticated visitors away from entry views. Protected content is never
//! served while the store is still loading; the guard awaits resolution
//! first, so nothing flickers before the redirect fires.

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error};

use crate::session::SessionContext;
use crate::settings::AuthrelaySettings;
use crate::utils::responses::redirect_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires an identity; anonymous visitors are sent to login
    Protected,
    /// Entry-only view; authenticated visitors are sent to the dashboard
    Entry,
    /// No session-based navigation applies
    Public,
}

/// Path classification rules plus the two navigation targets
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    protected: Vec<String>,
    entry: Vec<String>,
    pub login_path: String,
    pub dashboard_path: String,
}

impl RoutePolicy {
    #[must_use]
    pub fn from_settings(settings: &AuthrelaySettings) -> Self {
        Self {
            protected: settings.routes.protected.clone(),
            entry: settings.routes.entry.clone(),
            login_path: settings.routes.login_path.clone(),
            dashboard_path: settings.routes.dashboard_path.clone(),
        }
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected.iter().any(|rule| path_matches(rule, path)) {
            RouteClass::Protected
        } else if self.entry.iter().any(|rule| path_matches(rule, path)) {
            RouteClass::Entry
        } else {
            RouteClass::Public
        }
    }
}

/// Segment-prefix match; the root rule only matches the root path
fn path_matches(rule: &str, path: &str) -> bool {
    if rule == "/" {
        return path == "/";
    }
    path == rule
        || path
            .strip_prefix(rule)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Middleware enforcing the route policy against the session store
pub async fn session_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let (Some(policy), Some(context)) = (
        req.app_data::<web::Data<RoutePolicy>>().cloned(),
        req.app_data::<web::Data<SessionContext>>().cloned(),
    ) else {
        // Guard not wired up; pass through
        return next.call(req).await.map(ServiceResponse::map_into_boxed_body);
    };

    match policy.classify(req.path()) {
        RouteClass::Public => next.call(req).await.map(ServiceResponse::map_into_boxed_body),
        RouteClass::Protected => {
            let session = context.resolved().await;
            if session.is_authenticated() {
                next.call(req).await.map(ServiceResponse::map_into_boxed_body)
            } else {
                log::debug!("anonymous visitor on {}, redirecting to login", req.path());
                Ok(req.into_response(redirect_to(&policy.login_path)))
            }
        }
        RouteClass::Entry => {
            let session = context.resolved().await;
            if session.is_authenticated() {
                log::debug!(
                    "authenticated visitor on entry view {}, redirecting to dashboard",
                    req.path()
                );
                Ok(req.into_response(redirect_to(&policy.dashboard_path)))
            } else {
                next.call(req).await.map(ServiceResponse::map_into_boxed_body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RoutePolicy {
        RoutePolicy::from_settings(&AuthrelaySettings::default())
    }

    #[test]
    fn dashboard_and_subpaths_are_protected() {
        let policy = policy();
        assert_eq!(policy.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(policy.classify("/dashboard/documents"), RouteClass::Protected);
    }

    #[test]
    fn entry_views_are_classified() {
        let policy = policy();
        assert_eq!(policy.classify("/"), RouteClass::Entry);
        assert_eq!(policy.classify("/login"), RouteClass::Entry);
        assert_eq!(policy.classify("/register"), RouteClass::Entry);
    }

    #[test]
    fn everything_else_is_public() {
        let policy = policy();
        assert_eq!(policy.classify("/ping"), RouteClass::Public);
        assert_eq!(policy.classify("/auth/callback"), RouteClass::Public);
        assert_eq!(policy.classify("/auth/login"), RouteClass::Public);
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let policy = policy();
        // "/dashboards" is a different path, not a dashboard subpath
        assert_eq!(policy.classify("/dashboards"), RouteClass::Public);
        assert_eq!(policy.classify("/loginish"), RouteClass::Public);
    }
}
