// Gate Configuration
// Loaded from an optional TOML file with COOPGATE_-prefixed environment
// overrides, then range-checked before the server starts.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::AuthError;

/// Fixed session lifetime: 5 days, matching the cookie Max-Age.
pub const SESSION_TTL_SECS: u64 = 432_000;

/// Top-level configuration for the gate server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port (0 = ephemeral, used by tests)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Production flag; controls the cookie Secure attribute
    #[serde(default)]
    pub production: bool,

    /// Identity provider client settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Document store client settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Session cookie settings
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            production: false,
            identity: IdentityConfig::default(),
            store: StoreConfig::default(),
            cookie: CookieConfig::default(),
        }
    }
}

impl GateConfig {
    /// Load configuration: defaults, then the TOML file (if present), then
    /// environment variables prefixed `COOPGATE_` (nested keys split on `__`).
    pub fn load(path: Option<&Path>) -> Result<Self, AuthError> {
        let mut figment = Figment::from(Serialized::defaults(GateConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: GateConfig = figment
            .merge(Env::prefixed("COOPGATE_").split("__"))
            .extract()
            .map_err(|e| AuthError::InvalidConfig {
                key: "config".to_string(),
                reason: e.to_string(),
            })?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AuthError> {
        self.identity.validate()?;
        self.store.validate()?;
        self.cookie.validate()?;
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity provider client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider's REST API
    #[serde(default = "default_identity_url")]
    pub base_url: String,

    /// API key sent with every call (opaque to this service)
    #[serde(default)]
    pub api_key: String,

    /// Per-call timeout in seconds; expiry is treated as verification failure
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_url(),
            api_key: String::new(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl IdentityConfig {
    fn validate(&self) -> Result<(), AuthError> {
        if self.api_key.is_empty() {
            return Err(AuthError::MissingConfig("identity.api_key".to_string()));
        }
        validate_base_url("identity.base_url", &self.base_url)?;
        if self.call_timeout_secs == 0 || self.call_timeout_secs > 60 {
            return Err(AuthError::InvalidConfig {
                key: "identity.call_timeout_secs".to_string(),
                reason: "must be between 1 and 60 seconds".to_string(),
            });
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Document store client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document store's REST API
    #[serde(default = "default_store_url")]
    pub base_url: String,

    /// API key sent with every call
    #[serde(default)]
    pub api_key: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            api_key: String::new(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), AuthError> {
        if self.api_key.is_empty() {
            return Err(AuthError::MissingConfig("store.api_key".to_string()));
        }
        validate_base_url("store.base_url", &self.base_url)?;
        if self.call_timeout_secs == 0 || self.call_timeout_secs > 60 {
            return Err(AuthError::InvalidConfig {
                key: "store.call_timeout_secs".to_string(),
                reason: "must be between 1 and 60 seconds".to_string(),
            });
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Max-Age in seconds
    #[serde(default = "default_cookie_max_age")]
    pub max_age_secs: u64,

    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            max_age_secs: default_cookie_max_age(),
            path: default_cookie_path(),
        }
    }
}

impl CookieConfig {
    fn validate(&self) -> Result<(), AuthError> {
        if self.name.is_empty() {
            return Err(AuthError::InvalidConfig {
                key: "cookie.name".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        if self.max_age_secs < 60 {
            return Err(AuthError::InvalidConfig {
                key: "cookie.max_age_secs".to_string(),
                reason: "must be at least 60 seconds".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_base_url(key: &str, value: &str) -> Result<(), AuthError> {
    let url = Url::parse(value).map_err(|e| AuthError::InvalidConfig {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AuthError::InvalidConfig {
            key: key.to_string(),
            reason: "must be an http or https URL".to_string(),
        });
    }
    Ok(())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_identity_url() -> String {
    "https://identity.example.com".to_string()
}

fn default_store_url() -> String {
    "https://docstore.example.com".to_string()
}

fn default_call_timeout() -> u64 {
    10
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_cookie_max_age() -> u64 {
    SESSION_TTL_SECS
}

fn default_cookie_path() -> String {
    "/".to_string()
}
