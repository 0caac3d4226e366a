// End-to-end tests of the gate router: guard redirects, login issuing the
// session cookie, the reader as trust boundary behind the guard, and
// sign-out idempotence. External collaborators are replaced with in-memory
// fakes injected through AppState.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use coopgate::{
    AppState, AuthError, CredentialVerifier, GateConfig, IdentityClaims, Role, UserRecord,
    UserStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const VALID_ID_TOKEN: &str = "valid-id-token";
const MINTED_ARTIFACT: &str = "minted-artifact";
const ADMIN_ARTIFACT: &str = "admin-artifact";

/// Identity provider fake: one recognized identity token, two recognized
/// session artifacts (member and admin), everything else rejected.
struct FakeVerifier;

fn member_claims(role: Option<&str>) -> IdentityClaims {
    IdentityClaims {
        uid: "uid-1".to_string(),
        email: Some("m@coop.test".to_string()),
        name: Some("Member One".to_string()),
        picture: None,
        role: role.map(str::to_string),
    }
}

#[async_trait]
impl CredentialVerifier for FakeVerifier {
    async fn verify_identity_token(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        if token == VALID_ID_TOKEN {
            Ok(member_claims(None))
        } else {
            Err(AuthError::InvalidToken("unrecognized".to_string()))
        }
    }

    async fn mint_session_artifact(
        &self,
        _token: &str,
        _ttl: Duration,
    ) -> Result<String, AuthError> {
        Ok(MINTED_ARTIFACT.to_string())
    }

    async fn verify_session_artifact(&self, artifact: &str) -> Result<IdentityClaims, AuthError> {
        match artifact {
            MINTED_ARTIFACT => Ok(member_claims(Some("member"))),
            ADMIN_ARTIFACT => Ok(member_claims(Some("admin"))),
            _ => Err(AuthError::TokenExpired),
        }
    }

    async fn set_role_claim(&self, _uid: &str, _role: Role) -> Result<(), AuthError> {
        Ok(())
    }
}

/// In-memory user store with create-if-absent semantics.
#[derive(Default)]
struct FakeStore {
    records: Mutex<HashMap<String, UserRecord>>,
}

#[async_trait]
impl UserStore for FakeStore {
    async fn get_user_record(&self, uid: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.records.lock().unwrap().get(uid).cloned())
    }

    async fn create_user_record(&self, uid: &str, record: UserRecord) -> Result<(), AuthError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(uid) {
            return Err(AuthError::AlreadyExists);
        }
        records.insert(uid.to_string(), record);
        Ok(())
    }
}

fn test_router_with_store(store: Arc<FakeStore>) -> axum::Router {
    let mut config = GateConfig::default();
    config.identity.api_key = "unused-by-fakes".to_string();
    config.store.api_key = "unused-by-fakes".to_string();
    let state = AppState::new(&config, Arc::new(FakeVerifier), store);
    coopgate::build_router(state)
}

fn test_router() -> axum::Router {
    test_router_with_store(Arc::new(FakeStore::default()))
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn guard_redirects_protected_paths_without_cookie() {
    let router = test_router();
    for path in ["/dashboard", "/admin"] {
        let response = router.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {}", path);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn guard_redirects_auth_pages_when_cookie_present() {
    // Presence check only: even a garbage cookie redirects away from /login
    let router = test_router();
    for path in ["/login", "/signup"] {
        let response = router
            .clone()
            .oneshot(get_with_cookie(path, "session=garbage"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {}", path);
        assert_eq!(location(&response), "/dashboard");
    }
}

#[tokio::test]
async fn guard_passes_auth_pages_when_logged_out() {
    let router = test_router();
    let response = router.clone().oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_cookie_passes_guard_but_reader_rejects() {
    // The guard is an optimization, not the security boundary: a forged
    // artifact gets past the presence check and is bounced by the reader.
    let router = test_router();
    let response = router
        .oneshot(get_with_cookie("/dashboard", "session=forged"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn verified_cookie_reaches_dashboard() {
    let router = test_router();
    let response = router
        .oneshot(get_with_cookie(
            "/dashboard",
            &format!("session={}", MINTED_ARTIFACT),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_page_requires_admin_role() {
    let router = test_router();

    let response = router
        .clone()
        .oneshot(get_with_cookie(
            "/admin",
            &format!("session={}", MINTED_ARTIFACT),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(get_with_cookie(
            "/admin",
            &format!("session={}", ADMIN_ARTIFACT),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_issues_cookie_and_creates_user_record() {
    let store = Arc::new(FakeStore::default());
    let router = test_router_with_store(Arc::clone(&store));

    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"id_token":"{}"}}"#, VALID_ID_TOKEN)))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(set_cookie.starts_with(&format!("session={}; Max-Age=432000", MINTED_ARTIFACT)));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    // Development config: no Secure attribute
    assert!(!set_cookie.contains("Secure"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "member");

    let record = store
        .records
        .lock()
        .unwrap()
        .get("uid-1")
        .cloned()
        .expect("first-login record");
    assert_eq!(record.role, "member");
}

#[tokio::test]
async fn login_with_invalid_token_sets_no_cookie() {
    let router = test_router();
    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"id_token":"wrong"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to create session.");
}

#[tokio::test]
async fn current_session_is_null_when_logged_out() {
    let router = test_router();
    let response = router.oneshot(get("/api/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::Value::Null);
}

#[tokio::test]
async fn current_session_decodes_verified_cookie() {
    let router = test_router();
    let response = router
        .oneshot(get_with_cookie(
            "/api/session",
            &format!("session={}", ADMIN_ARTIFACT),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["uid"], "uid-1");
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let router = test_router();

    for _ in 0..2 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/session/logout")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie header");
        assert!(set_cookie.starts_with("session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
