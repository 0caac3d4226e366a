// Session Reader
// Full verification of the session cookie on every protected request.
// Absence and verification failure are both the normal logged-out state,
// returned as None; only a verified artifact yields a Session.

use std::sync::Arc;
use tracing::debug;

use crate::identity::CredentialVerifier;
use crate::session::cookie::find_cookie;
use crate::session::Session;

pub struct SessionReader {
    verifier: Arc<dyn CredentialVerifier>,
    cookie_name: String,
}

impl SessionReader {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, cookie_name: String) -> Self {
        Self {
            verifier,
            cookie_name,
        }
    }

    /// Read and verify the session from an inbound Cookie header.
    /// Read-only; no side effects.
    pub async fn read(&self, cookie_header: Option<&str>) -> Option<Session> {
        let artifact = cookie_header.and_then(|h| find_cookie(h, &self.cookie_name))?;

        match self.verifier.verify_session_artifact(artifact).await {
            Ok(claims) => Some(Session::from(claims)),
            Err(e) => {
                // Expired or forged cookies degrade to logged-out
                debug!(error = %e, "session artifact rejected");
                None
            }
        }
    }
}
