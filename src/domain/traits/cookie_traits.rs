use async_trait::async_trait;
use crate::domain::models::cookie_models::{Cookie, CookieError, CookieQuery, SetCookieDetails};

/// The browser's native, per-profile cookie store.
#[async_trait]
pub trait CookieStore: Send + Sync + 'static {
    async fn get_all(&self, query: &CookieQuery) -> Result<Vec<Cookie>, CookieError>;

    /// Writes a cookie and returns it as stored.
    async fn set(&self, details: SetCookieDetails) -> Result<Cookie, CookieError>;

    /// Removes the cookie named `name` that applies to `url`. `Ok(None)` when
    /// nothing matched.
    async fn remove(&self, url: &str, name: &str) -> Result<Option<Cookie>, CookieError>;
}
