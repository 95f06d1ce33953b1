use async_trait::async_trait;
use crate::domain::models::page_models::{ClipboardError, DocumentError, Element, ElementId};

/// The slice of a page's DOM the core touches.
pub trait Document: Send + Sync + 'static {
    /// Unique per page load; a reload yields a new id.
    fn instance_id(&self) -> String;

    /// `document.cookie`.
    fn cookie_string(&self) -> String;

    /// `location.hostname`.
    fn hostname(&self) -> String;

    fn append(&self, element: Element) -> Result<ElementId, DocumentError>;

    /// Returns false if the element was already gone.
    fn remove(&self, id: &ElementId) -> bool;

    fn contains(&self, id: &ElementId) -> bool;

    fn fade_out(&self, id: &ElementId);

    /// Focuses and selects the contents of a scratch element.
    fn select(&self, id: &ElementId) -> Result<(), DocumentError>;

    /// `document.execCommand("copy")` on the current selection.
    fn exec_copy(&self) -> Result<bool, DocumentError>;
}

/// Asynchronous clipboard API (`navigator.clipboard`).
#[async_trait]
pub trait Clipboard: Send + Sync + 'static {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}
