// Session Issuer
// Login-time orchestration: verify the identity token, resolve or create
// the user record, mirror the role into the provider's claims, then mint
// the 5-day session cookie. Every failure path is converted into a typed
// outcome so the calling handler never sees a raw error.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::SESSION_TTL_SECS;
use crate::identity::CredentialVerifier;
use crate::roles::{Role, RoleResolver};
use crate::session::cookie::CookieSettings;

/// Generic user-facing message; issuance failures carry no detail.
pub const ISSUE_FAILED_MESSAGE: &str = "Failed to create session.";

/// A successfully issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub role: Role,
    /// Rendered Set-Cookie header value carrying the minted artifact
    pub set_cookie: String,
}

/// Result of a session issuance attempt. Never an Err: the issuer's
/// boundary contract is that failures come back as a typed outcome.
#[derive(Debug, Clone)]
pub enum IssueOutcome {
    Issued(IssuedSession),
    Failed { message: &'static str },
}

impl IssueOutcome {
    pub fn is_issued(&self) -> bool {
        matches!(self, IssueOutcome::Issued(_))
    }
}

pub struct SessionIssuer {
    verifier: Arc<dyn CredentialVerifier>,
    resolver: RoleResolver,
    cookie: CookieSettings,
}

impl SessionIssuer {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        resolver: RoleResolver,
        cookie: CookieSettings,
    ) -> Self {
        Self {
            verifier,
            resolver,
            cookie,
        }
    }

    /// Issue a session from a caller-supplied identity token.
    pub async fn create_session(&self, id_token: &str) -> IssueOutcome {
        match self.try_create(id_token).await {
            Ok(issued) => {
                info!(role = issued.role.as_str(), "session issued");
                IssueOutcome::Issued(issued)
            }
            Err(e) => {
                warn!(error = %e, "session issuance failed");
                IssueOutcome::Failed {
                    message: ISSUE_FAILED_MESSAGE,
                }
            }
        }
    }

    async fn try_create(&self, id_token: &str) -> Result<IssuedSession, crate::error::AuthError> {
        let claims = self.verifier.verify_identity_token(id_token).await?;

        // Best-effort internally: a first-login store write failure leaves
        // the caller signed in as member.
        let role = self
            .resolver
            .resolve(&claims.uid, claims.email.as_deref())
            .await;

        self.verifier.set_role_claim(&claims.uid, role).await?;

        let artifact = self
            .verifier
            .mint_session_artifact(id_token, Duration::from_secs(SESSION_TTL_SECS))
            .await?;

        Ok(IssuedSession {
            role,
            set_cookie: self.cookie.build(&artifact),
        })
    }
}
