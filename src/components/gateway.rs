use crate::domain::models::cookie_models::{Cookie, CookieError, CookieQuery, SetCookieDetails};
use crate::domain::models::tab_models::{Tab, TabError};
use crate::domain::traits::cookie_traits::CookieStore;
use crate::domain::traits::tab_traits::TabQuery;
use crate::service::config::GatewayConfig;
use crate::utils::url_component::removal_url;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

macro_rules! bounded {
    ( $limit:expr, $call:expr ) => {{
        match timeout($limit, $call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(GatewayError::from(e)),
            Err(_) => Err(GatewayError::Timeout($limit)),
        }
    }};
}

/// Which cookies to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieFilter {
    Domain(String),
    Url(String),
    /// Whatever URL the active tab shows; nothing if there is no tab.
    ActiveTab,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Store(#[from] CookieError),
    #[error(transparent)]
    Tab(#[from] TabError),
    #[error("Browser call timed out after {0:?}")]
    Timeout(Duration),
}

/// Sole path to the native cookie store. Every call is bounded by the
/// configured timeout.
pub struct CookieGateway {
    store: Arc<dyn CookieStore>,
    tabs: Arc<dyn TabQuery>,
    call_timeout: Duration,
}

impl CookieFilter {
    /// A non-empty domain beats a non-empty URL; with neither, the active
    /// tab decides.
    pub fn from_parts(domain: Option<String>, url: Option<String>) -> Self {
        let domain = domain.filter(|domain| !domain.trim().is_empty());
        let url = url.filter(|url| !url.trim().is_empty());

        match (domain, url) {
            (Some(domain), _) => CookieFilter::Domain(domain),
            (None, Some(url)) => CookieFilter::Url(url),
            (None, None) => CookieFilter::ActiveTab,
        }
    }
}

impl CookieGateway {
    pub fn new(
        store: Arc<dyn CookieStore>,
        tabs: Arc<dyn TabQuery>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            store,
            tabs,
            call_timeout: config.call_timeout,
        }
    }

    pub async fn active_tab(&self) -> Result<Option<Tab>, GatewayError> {
        bounded!(self.call_timeout, self.tabs.active_tab())
    }

    pub async fn list_cookies(&self, filter: CookieFilter) -> Result<Vec<Cookie>, GatewayError> {
        let query = match filter {
            CookieFilter::Domain(domain) => CookieQuery::Domain(domain),
            CookieFilter::Url(url) => CookieQuery::Url(url),
            CookieFilter::ActiveTab => {
                let tab = self.active_tab().await?;
                match tab.as_ref().and_then(Tab::page_url) {
                    Some(url) => CookieQuery::Url(url.to_string()),
                    None => {
                        debug!("no active tab to list cookies for");
                        return Ok(Vec::new());
                    }
                }
            }
        };

        bounded!(self.call_timeout, self.store.get_all(&query))
    }

    pub async fn set_cookie(&self, details: SetCookieDetails) -> Result<Cookie, GatewayError> {
        debug!(name = %details.name, url = %details.url, "setting cookie");
        bounded!(self.call_timeout, self.store.set(details))
    }

    /// Removes a cookie given its stored attributes. Returns whether the
    /// store actually held it.
    pub async fn remove_cookie(
        &self,
        domain: &str,
        path: &str,
        secure: bool,
        name: &str,
    ) -> Result<bool, GatewayError> {
        let url = removal_url(domain, path, secure);
        debug!(%url, %name, "removing cookie");

        let removed: Option<Cookie> = bounded!(self.call_timeout, self.store.remove(&url, name))?;
        Ok(removed.is_some())
    }
}
