use async_trait::async_trait;
use crate::domain::models::tab_models::{Tab, TabError};

#[async_trait]
pub trait TabQuery: Send + Sync + 'static {
    /// The focused tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<Tab>, TabError>;

    async fn create(&self, url: &str) -> Result<Tab, TabError>;
}

/// Extension runtime facts the controller needs for lifecycle events.
pub trait ExtensionHost: Send + Sync + 'static {
    fn resource_url(&self, path: &str) -> String;

    fn manifest_version(&self) -> String;
}
