use crate::domain::models::cookie_models::{
    Cookie, CookieError, CookieKey, CookieQuery, SameSite, SetCookieDetails,
};
use crate::domain::traits::cookie_traits::CookieStore;
use crate::utils::url_component::{domain_matches, path_matches};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock as AsyncRwLock;
use url::Url;

/// Cookie store held in memory with the matching rules a browser applies.
///
/// Backs headless hosts and tests. Optional latency simulates a slow
/// browser API so callers' timeouts can be exercised.
pub struct MemoryCookieStore {
    inner: AsyncRwLock<InnerStore>,
    latency: Option<Duration>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct InnerStore {
    cookies: Vec<Cookie>,
    removal_log: Vec<(String, String)>,
    set_log: Vec<SetCookieDetails>,
}

struct RequestTarget {
    host: String,
    path: String,
    https: bool,
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    async fn get_all(&self, query: &CookieQuery) -> Result<Vec<Cookie>, CookieError> {
        self.simulate_latency().await?;
        let store = self.inner.read().await;
        let now = now_secs();

        let live = store.cookies.iter().filter(|cookie| !cookie.is_expired_at(now));

        let mut cookies: Vec<Cookie> = match query {
            CookieQuery::Domain(domain) => {
                let domain = domain.strip_prefix('.').unwrap_or(domain);
                live.filter(|cookie| {
                    let cookie_domain = cookie.domain.strip_prefix('.').unwrap_or(&cookie.domain);
                    domain_matches(cookie_domain, domain)
                })
                .cloned()
                .collect()
            }
            CookieQuery::Url(url) => {
                let target = RequestTarget::parse(url)?;
                live.filter(|cookie| target.accepts(cookie)).cloned().collect()
            }
        };

        cookies.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        Ok(cookies)
    }

    async fn set(&self, details: SetCookieDetails) -> Result<Cookie, CookieError> {
        self.simulate_latency().await?;
        let target = RequestTarget::parse(&details.url)?;

        let (domain, host_only) = match details.domain.as_deref() {
            Some(domain) if !domain.is_empty() => {
                if !domain_matches(&target.host, domain) {
                    return Err(CookieError::Rejected(format!(
                        "domain {domain} does not match {}",
                        target.host
                    )));
                }
                let bare = domain.strip_prefix('.').unwrap_or(domain);
                (format!(".{bare}"), false)
            }
            _ => (target.host.clone(), true),
        };

        if details.secure && !target.https {
            return Err(CookieError::Rejected(
                "secure cookies require an https URL".to_string(),
            ));
        }
        let same_site = details.same_site;
        if same_site == Some(SameSite::NoRestriction) && !details.secure {
            return Err(CookieError::Rejected(
                "SameSite=None requires the Secure attribute".to_string(),
            ));
        }

        let path = match details.path.as_deref() {
            Some(path) if path.starts_with('/') => path.to_string(),
            _ => default_path(&target.path),
        };

        let cookie = Cookie {
            name: details.name.clone(),
            value: details.value.clone(),
            domain,
            path,
            secure: details.secure,
            http_only: details.http_only,
            same_site: Some(same_site.unwrap_or(SameSite::Unspecified)),
            expiration_date: details.expiration_date,
            host_only,
            session: details.expiration_date.is_none(),
            store_id: Some("0".to_string()),
        };

        let mut store = self.inner.write().await;
        let key = cookie.key();
        store.cookies.retain(|existing| existing.key() != key);
        store.set_log.push(details);
        if !cookie.is_expired_at(now_secs()) {
            store.cookies.push(cookie.clone());
        }

        Ok(cookie)
    }

    async fn remove(&self, url: &str, name: &str) -> Result<Option<Cookie>, CookieError> {
        self.simulate_latency().await?;
        let target = RequestTarget::parse(url)?;

        let mut store = self.inner.write().await;
        store.removal_log.push((url.to_string(), name.to_string()));

        let position = store
            .cookies
            .iter()
            .enumerate()
            .filter(|(_, cookie)| cookie.name == name && target.accepts(cookie))
            .max_by_key(|(_, cookie)| cookie.path.len())
            .map(|(index, _)| index);

        Ok(position.map(|index| store.cookies.remove(index)))
    }
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::with_cookies(Vec::new())
    }

    pub fn with_cookies(initial_cookies: Vec<Cookie>) -> Self {
        Self {
            inner: AsyncRwLock::new(InnerStore {
                cookies: initial_cookies,
                ..InnerStore::default()
            }),
            latency: None,
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Inserts a cookie directly, the way a visited site would.
    pub async fn insert(&self, cookie: Cookie) {
        let mut store = self.inner.write().await;
        let key: CookieKey = cookie.key();
        store.cookies.retain(|existing| existing.key() != key);
        store.cookies.push(cookie);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.cookies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// `(url, name)` of every removal call, in order.
    pub async fn removal_log(&self) -> Vec<(String, String)> {
        self.inner.read().await.removal_log.clone()
    }

    pub async fn set_log(&self) -> Vec<SetCookieDetails> {
        self.inner.read().await.set_log.clone()
    }

    /// While set, every store call fails the way a disconnected host does.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) -> Result<(), CookieError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CookieError::Store("cookie store unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTarget {
    fn parse(url: &str) -> Result<Self, CookieError> {
        let parsed = Url::parse(url).map_err(|e| CookieError::InvalidUrl(format!("{url}: {e}")))?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| CookieError::InvalidUrl(format!("{url}: no host")))?;

        Ok(Self {
            host: host.to_lowercase(),
            path: parsed.path().to_string(),
            https: parsed.scheme() == "https",
        })
    }

    fn accepts(&self, cookie: &Cookie) -> bool {
        let host_ok = if cookie.host_only {
            self.host.eq_ignore_ascii_case(&cookie.domain)
        } else {
            domain_matches(&self.host, &cookie.domain)
        };

        host_ok && path_matches(&self.path, &cookie.path) && (!cookie.secure || self.https)
    }
}

fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! await_test {
        ($e:expr) => {
            tokio_test::block_on($e)
        };
    }

    fn seeded() -> MemoryCookieStore {
        MemoryCookieStore::with_cookies(vec![
            Cookie::new("example.com", "/", "host_only", "1"),
            Cookie::new(".example.com", "/", "parent", "2"),
            Cookie::new("sub.example.com", "/", "child", "3"),
            Cookie::new("example.com", "/admin", "scoped", "4"),
            Cookie::new("example.com", "/", "locked", "5").with_secure(true),
            Cookie::new("other.org", "/", "foreign", "6"),
        ])
    }

    fn names(cookies: &[Cookie]) -> Vec<&str> {
        let mut names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_domain_query_includes_subdomains() {
        let store = seeded();
        let cookies =
            await_test!(store.get_all(&CookieQuery::Domain("example.com".to_string()))).unwrap();
        assert_eq!(
            names(&cookies),
            vec!["child", "host_only", "locked", "parent", "scoped"]
        );
    }

    #[test]
    fn test_url_query_applies_browser_rules() {
        let store = seeded();
        let cookies = await_test!(
            store.get_all(&CookieQuery::Url("http://sub.example.com/".to_string()))
        )
        .unwrap();
        assert_eq!(names(&cookies), vec!["child", "parent"]);

        let cookies = await_test!(
            store.get_all(&CookieQuery::Url("https://example.com/admin/x".to_string()))
        )
        .unwrap();
        assert_eq!(names(&cookies), vec!["host_only", "locked", "parent", "scoped"]);
        assert_eq!(cookies[0].name, "scoped");
    }

    #[test]
    fn test_set_rejects_foreign_domain() {
        let store = MemoryCookieStore::new();
        let mut details = SetCookieDetails::new("https://example.com/", "a", "1");
        details.domain = Some("other.org".to_string());

        let result = await_test!(store.set(details));
        assert!(matches!(result, Err(CookieError::Rejected(_))));
        assert!(await_test!(store.is_empty()));
    }

    #[test]
    fn test_set_rejects_insecure_same_site_none() {
        let store = MemoryCookieStore::new();
        let mut details = SetCookieDetails::new("https://example.com/", "a", "1");
        details.same_site = Some(SameSite::NoRestriction);

        assert!(await_test!(store.set(details)).is_err());
    }

    #[test]
    fn test_set_replaces_same_key() {
        let store = MemoryCookieStore::new();
        let mut details = SetCookieDetails::new("https://example.com/", "a", "1");
        details.path = Some("/".to_string());
        await_test!(store.set(details.clone())).unwrap();
        details.value = "2".to_string();
        let stored = await_test!(store.set(details)).unwrap();

        assert!(stored.host_only);
        assert_eq!(await_test!(store.len()), 1);
        let cookies = await_test!(
            store.get_all(&CookieQuery::Url("https://example.com/".to_string()))
        )
        .unwrap();
        assert_eq!(cookies[0].value, "2");
    }

    #[test]
    fn test_remove_by_url_and_name() {
        let store = seeded();
        let removed =
            await_test!(store.remove("http://example.com/admin", "scoped")).unwrap();
        assert_eq!(removed.map(|c| c.value), Some("4".to_string()));

        let removed = await_test!(store.remove("http://example.com/", "locked")).unwrap();
        assert!(removed.is_none());

        assert_eq!(await_test!(store.removal_log()).len(), 2);
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let store = seeded();
        store.set_unavailable(true);

        let result = await_test!(store.get_all(&CookieQuery::Domain("example.com".to_string())));
        assert!(matches!(result, Err(CookieError::Store(_))));
        let result = await_test!(store.remove("http://example.com/", "host_only"));
        assert!(matches!(result, Err(CookieError::Store(_))));
        assert!(await_test!(store.removal_log()).is_empty());

        store.set_unavailable(false);
        assert!(await_test!(store.remove("http://example.com/", "host_only")).unwrap().is_some());
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("/a"), "/");
        assert_eq!(default_path("/a/b"), "/a");
    }
}
