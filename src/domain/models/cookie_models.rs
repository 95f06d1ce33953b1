use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CookieKey {
    pub domain: String,
    pub path: String,
    pub name: String,
}

/// A cookie as the browser's store reports it.
///
/// Field names follow the store's wire shape (`httpOnly`, `sameSite`,
/// `expirationDate`) so records pass through the message bus untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    /// Epoch seconds. `None` marks a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(default)]
    pub host_only: bool,
    #[serde(default)]
    pub session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    NoRestriction,
    Lax,
    Strict,
    Unspecified,
}

/// Parameters of a cookie write. `url` decides default domain, path and
/// scheme; every other field is optional the way the store accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieDetails {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
}

/// Query shape accepted by the native store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieQuery {
    /// Cookies whose domain equals or is a subdomain of the given domain.
    Domain(String),
    /// Cookies the browser would send with a request to the given URL.
    Url(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Cookie rejected: {0}")]
    Rejected(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Store error: {0}")]
    Store(String),
}

impl Cookie {
    pub fn new(domain: &str, path: &str, name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
            secure: false,
            http_only: false,
            same_site: Some(SameSite::Unspecified),
            expiration_date: None,
            host_only: !domain.starts_with('.'),
            session: true,
            store_id: None,
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn with_expiration(mut self, expiration_date: f64) -> Self {
        self.expiration_date = Some(expiration_date);
        self.session = false;
        self
    }

    pub fn key(&self) -> CookieKey {
        CookieKey {
            domain: self.domain.clone(),
            path: self.path.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_session(&self) -> bool {
        self.expiration_date.is_none()
    }

    pub fn is_expired_at(&self, now_secs: f64) -> bool {
        match self.expiration_date {
            Some(expires) => expires <= now_secs,
            None => false,
        }
    }

    /// `name=value`, the unit of every clipboard format.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl SetCookieDetails {
    pub fn new(url: &str, name: &str, value: &str) -> Self {
        Self {
            url: url.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
            expiration_date: None,
        }
    }

    /// `SameSite=None` cookies must be `Secure`; the store may silently drop
    /// or reject them otherwise.
    pub fn enforce_same_site_invariant(mut self) -> Self {
        if self.same_site == Some(SameSite::NoRestriction) {
            self.secure = true;
        }
        self
    }
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::NoRestriction => "no_restriction",
            SameSite::Lax => "lax",
            SameSite::Strict => "strict",
            SameSite::Unspecified => "unspecified",
        }
    }

    /// Parses the panel's select value. Anything unknown maps to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "no_restriction" | "none" => Some(SameSite::NoRestriction),
            "lax" => Some(SameSite::Lax),
            "strict" => Some(SameSite::Strict),
            "unspecified" => Some(SameSite::Unspecified),
            _ => None,
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
