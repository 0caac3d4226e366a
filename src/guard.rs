// Route Guard
// Coarse request interception based on session-cookie *presence* only.
// The guard never verifies the artifact: it is an optimization for the
// common path, not the security boundary. A forged or expired cookie
// passes here and is rejected by the SessionReader inside the protected
// handler, which performs full verification.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::session::find_cookie;
use crate::AppState;

/// Prefixes requiring a session to enter.
pub const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/admin"];

/// Pages only shown to logged-out visitors.
pub const AUTH_PATHS: &[&str] = &["/login", "/signup"];

/// Guard decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// Paths the guard never inspects: API routes and static assets.
pub fn is_excluded(path: &str) -> bool {
    path.starts_with("/api/") || path.starts_with("/assets/") || path == "/favicon.ico"
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// The redirect decision table. Presence check only; validity is not
/// considered here.
pub fn decide(path: &str, session_cookie_present: bool) -> GuardDecision {
    if AUTH_PATHS.contains(&path) {
        return if session_cookie_present {
            GuardDecision::Redirect("/dashboard")
        } else {
            GuardDecision::Pass
        };
    }

    let protected = PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path_has_prefix(path, prefix));
    if protected && !session_cookie_present {
        return GuardDecision::Redirect("/login");
    }

    GuardDecision::Pass
}

/// Axum middleware applying the decision table to every non-excluded request.
pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if is_excluded(path) {
        return next.run(req).await;
    }

    let cookie_present = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| find_cookie(h, &state.cookie.name))
        .is_some();

    match decide(path, cookie_present) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Redirect(target) => {
            debug!(path = %path, target = %target, "route guard redirect");
            Redirect::to(target).into_response()
        }
    }
}
