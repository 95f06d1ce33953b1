use crate::utils::url_component::{UrlParseError, parse_origin};
use serde::{Deserialize, Serialize};

/// A browser tab as the host reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Site context derived from a tab's URL. Rebuilt on every use since the
/// active tab can change between two messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabContext {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub domain: String,
    /// Scheme with its trailing colon, e.g. `https:`.
    pub protocol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
    SharedModuleUpdate,
}

#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("Tab query failed: {0}")]
    Query(String),
    #[error("Tab creation failed: {0}")]
    Create(String),
}

impl Tab {
    pub fn new(id: i64, url: &str, title: &str) -> Self {
        Self {
            id,
            url: Some(url.to_string()),
            title: Some(title.to_string()),
        }
    }

    /// The tab's URL when it has a non-empty one.
    pub fn page_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

impl TabContext {
    pub fn from_tab(tab: &Tab) -> Result<Self, UrlParseError> {
        let url = tab.page_url().ok_or(UrlParseError::NoHost)?;
        let origin = parse_origin(url)?;

        Ok(Self {
            id: tab.id,
            url: url.to_string(),
            title: tab.title.clone().unwrap_or_default(),
            domain: origin.hostname,
            protocol: origin.protocol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_tab() {
        let tab = Tab::new(7, "https://sub.example.com:8443/a/b?q=1", "Example");
        let context = TabContext::from_tab(&tab).unwrap();

        assert_eq!(context.id, 7);
        assert_eq!(context.domain, "sub.example.com");
        assert_eq!(context.protocol, "https:");
        assert_eq!(context.title, "Example");
    }

    #[test]
    fn test_context_requires_url() {
        let tab = Tab {
            id: 1,
            url: None,
            title: None,
        };
        assert!(TabContext::from_tab(&tab).is_err());

        let tab = Tab::new(1, "not a url", "");
        assert!(TabContext::from_tab(&tab).is_err());
    }
}
