use crate::domain::models::tab_models::{Tab, TabError};
use crate::domain::traits::tab_traits::{ExtensionHost, TabQuery};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::RwLock as AsyncRwLock;

/// Tab host with a settable active tab.
pub struct MemoryTabs {
    active: AsyncRwLock<Option<Tab>>,
    created: AsyncRwLock<Vec<Tab>>,
    next_id: AtomicI64,
    fail_create: AtomicBool,
    fail_query: AtomicBool,
}

#[async_trait]
impl TabQuery for MemoryTabs {
    async fn active_tab(&self) -> Result<Option<Tab>, TabError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(TabError::Query("tabs API unavailable".to_string()));
        }
        Ok(self.active.read().await.clone())
    }

    async fn create(&self, url: &str) -> Result<Tab, TabError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(TabError::Create(format!("cannot open {url}")));
        }

        let tab = Tab {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            url: Some(url.to_string()),
            title: None,
        };
        self.created.write().await.push(tab.clone());
        Ok(tab)
    }
}

impl MemoryTabs {
    pub fn new() -> Self {
        Self {
            active: AsyncRwLock::new(None),
            created: AsyncRwLock::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            fail_create: AtomicBool::new(false),
            fail_query: AtomicBool::new(false),
        }
    }

    pub fn with_active(tab: Tab) -> Self {
        Self {
            active: AsyncRwLock::new(Some(tab)),
            ..Self::new()
        }
    }

    pub async fn activate(&self, tab: Option<Tab>) {
        *self.active.write().await = tab;
    }

    pub fn fail_tab_creation(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_tab_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    pub async fn created(&self) -> Vec<Tab> {
        self.created.read().await.clone()
    }
}

impl Default for MemoryTabs {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StaticExtensionHost {
    base_url: String,
    version: String,
}

impl StaticExtensionHost {
    pub fn new(base_url: &str, version: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
        }
    }
}

impl Default for StaticExtensionHost {
    fn default() -> Self {
        Self::new("chrome-extension://cookie-copier", env!("CARGO_PKG_VERSION"))
    }
}

impl ExtensionHost for StaticExtensionHost {
    fn resource_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn manifest_version(&self) -> String {
        self.version.clone()
    }
}
