// Authentication Error Types
// Error taxonomy for identity verification, session issuance and the user store

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    // Identity-token errors (issuance time)
    #[error("Invalid identity token: {0}")]
    InvalidToken(String),

    #[error("Identity token expired")]
    TokenExpired,

    #[error("Session artifact minting failed: {0}")]
    MintFailed(String),

    #[error("Role claim update failed: {0}")]
    ClaimUpdateFailed(String),

    // User store errors
    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("User record already exists")]
    AlreadyExists,

    // Configuration errors
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    // Network/HTTP errors
    #[error("Upstream HTTP request failed: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    // General errors
    #[error("Internal authentication error: {0}")]
    Internal(String),

    #[error("Upstream service timeout")]
    Timeout,
}

// Conversion from reqwest errors
impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::HttpError(err.to_string())
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::JsonError(err.to_string())
    }
}

// HTTP status code mapping for error responses
impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidToken(_) | AuthError::TokenExpired => 401,

            AuthError::AlreadyExists => 409,

            AuthError::MissingConfig(_)
            | AuthError::InvalidConfig { .. }
            | AuthError::Internal(_) => 500,

            AuthError::StoreUnavailable(_) | AuthError::HttpError(_) => 502,

            AuthError::Timeout => 504,

            _ => 400,
        }
    }

    /// True for failures the Role Resolver may tolerate on its best-effort
    /// write path (the duplicate create from a concurrent first login).
    pub fn is_benign_create_race(&self) -> bool {
        matches!(self, AuthError::AlreadyExists)
    }
}
