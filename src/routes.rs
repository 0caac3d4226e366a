// HTTP Surface
// Handlers mounting the session gate: login (session creation), session
// introspection, sign-out, and the protected placeholders that demonstrate
// the reader as the trust boundary behind the guard.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::session::{IssueOutcome, Session};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub id_token: String,
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

/// POST /api/session — issue a session from an identity token.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Response {
    match state.issuer.create_session(&request.id_token).await {
        IssueOutcome::Issued(issued) => (
            AppendHeaders([(header::SET_COOKIE, issued.set_cookie)]),
            Json(json!({ "success": true, "role": issued.role.as_str() })),
        )
            .into_response(),
        IssueOutcome::Failed { message } => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": message })),
        )
            .into_response(),
    }
}

/// GET /api/session — decoded session for the current request, or null.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Option<Session>> {
    Json(state.reader.read(cookie_header(&headers)).await)
}

/// Sign-out: expire the cookie and send the visitor to the login page.
/// Idempotent; an absent cookie is not an error.
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, state.cookie.expired())]),
        Redirect::to("/login"),
    )
        .into_response()
}

/// GET /dashboard — protected; the reader here is the trust boundary.
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.reader.read(cookie_header(&headers)).await {
        Some(session) => Html(format!(
            "<h1>Dashboard</h1><p>Signed in as {}</p>",
            session.email.as_deref().unwrap_or(&session.uid)
        ))
        .into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// GET /admin — protected and admin-only.
pub async fn admin(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.reader.read(cookie_header(&headers)).await {
        Some(session) if session.is_admin => {
            Html("<h1>Administration</h1>".to_string()).into_response()
        }
        Some(_) => StatusCode::FORBIDDEN.into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn login_page() -> Html<&'static str> {
    Html("<h1>Login</h1>")
}

pub async fn signup_page() -> Html<&'static str> {
    Html("<h1>Sign up</h1>")
}

pub async fn healthz() -> &'static str {
    "ok"
}
