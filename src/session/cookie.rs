// Session Cookie
// Rendering of the Set-Cookie header for the session artifact and parsing
// of the inbound Cookie header. Attributes are fixed at issuance: Max-Age
// (5 days by default), HttpOnly, Secure in production, SameSite=Lax, Path=/.

use crate::config::CookieConfig;

/// Settings baked into every session Set-Cookie header.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub max_age_secs: u64,
    pub path: String,
    /// Secure attribute; set from the production flag
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &CookieConfig, production: bool) -> Self {
        Self {
            name: config.name.clone(),
            max_age_secs: config.max_age_secs,
            path: config.path.clone(),
            secure: production,
        }
    }

    /// Render the Set-Cookie value carrying a freshly minted artifact.
    pub fn build(&self, artifact: &str) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}; HttpOnly; SameSite=Lax",
            self.name, artifact, self.max_age_secs, self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Render the Set-Cookie value that deletes the session cookie.
    pub fn expired(&self) -> String {
        let mut cookie = format!(
            "{}=; Max-Age=0; Path={}; HttpOnly; SameSite=Lax",
            self.name, self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find a named cookie's value in a Cookie header.
pub fn find_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        if k == name { Some(v) } else { None }
    })
}
