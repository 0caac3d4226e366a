// Credential Verifier
// Thin client over the external identity provider's REST API. The provider
// owns all cryptography: identity-token verification, session-artifact
// minting and verification, and custom claim updates. This module only
// shapes requests and maps failures into the AuthError taxonomy.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::IdentityConfig;
use crate::error::AuthError;
use crate::roles::Role;

/// Decoded claims from a verified identity token or session artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable identity identifier
    pub uid: String,

    pub email: Option<String>,

    pub name: Option<String>,

    pub picture: Option<String>,

    /// Custom role claim mirrored from the user record; absent until the
    /// first session issuance propagates it.
    pub role: Option<String>,
}

/// Contract with the external identity provider.
///
/// Injected rather than held as module-level state so the session
/// components can be exercised against substitutable fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify a short-lived identity token obtained after interactive login.
    async fn verify_identity_token(&self, token: &str) -> Result<IdentityClaims, AuthError>;

    /// Mint an opaque signed session artifact from a verified identity token.
    async fn mint_session_artifact(&self, token: &str, ttl: Duration)
        -> Result<String, AuthError>;

    /// Verify a session artifact presented in the session cookie.
    async fn verify_session_artifact(&self, artifact: &str) -> Result<IdentityClaims, AuthError>;

    /// Mirror the resolved role into the identity's custom claims so later
    /// artifact verifications carry it without a store read.
    async fn set_role_claim(&self, uid: &str, role: Role) -> Result<(), AuthError>;
}

#[derive(Debug, Serialize)]
struct VerifyTokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
struct MintSessionRequest<'a> {
    id_token: &'a str,
    ttl_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct MintSessionResponse {
    artifact: String,
}

#[derive(Debug, Serialize)]
struct VerifyArtifactRequest<'a> {
    artifact: &'a str,
}

#[derive(Debug, Serialize)]
struct SetClaimRequest<'a> {
    uid: &'a str,
    role: &'a str,
}

/// REST implementation of [`CredentialVerifier`].
pub struct HttpCredentialVerifier {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpCredentialVerifier {
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.call_timeout())
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/v1/{}?key={}", self.base_url, op, self.api_key)
    }

    async fn post_json<B: Serialize>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .http_client
            .post(self.endpoint(op))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

/// Map a non-success verification response to the token error taxonomy.
async fn token_error(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        AuthError::TokenExpired
    } else if status.is_client_error() {
        AuthError::InvalidToken(body)
    } else {
        AuthError::HttpError(format!("identity provider returned {}: {}", status, body))
    }
}

#[async_trait]
impl CredentialVerifier for HttpCredentialVerifier {
    async fn verify_identity_token(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let response = self
            .post_json("tokens:verify", &VerifyTokenRequest { id_token: token })
            .await?;
        if !response.status().is_success() {
            return Err(token_error(response).await);
        }
        let claims: IdentityClaims = response.json().await?;
        debug!(uid = %claims.uid, "identity token verified");
        Ok(claims)
    }

    async fn mint_session_artifact(
        &self,
        token: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let response = self
            .post_json(
                "sessions:mint",
                &MintSessionRequest {
                    id_token: token,
                    ttl_seconds: ttl.as_secs(),
                },
            )
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::MintFailed(format!("{}: {}", status, body)));
        }
        let minted: MintSessionResponse = response.json().await?;
        Ok(minted.artifact)
    }

    async fn verify_session_artifact(&self, artifact: &str) -> Result<IdentityClaims, AuthError> {
        let response = self
            .post_json("sessions:verify", &VerifyArtifactRequest { artifact })
            .await?;
        if !response.status().is_success() {
            return Err(token_error(response).await);
        }
        let claims: IdentityClaims = response.json().await?;
        Ok(claims)
    }

    async fn set_role_claim(&self, uid: &str, role: Role) -> Result<(), AuthError> {
        let response = self
            .post_json(
                "claims:set",
                &SetClaimRequest {
                    uid,
                    role: role.as_str(),
                },
            )
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::ClaimUpdateFailed(format!("{}: {}", status, body)));
        }
        debug!(uid = %uid, role = role.as_str(), "role claim updated");
        Ok(())
    }
}
