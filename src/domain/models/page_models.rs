use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for an element the core inserted into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

/// Elements the core asks a document to render. Styling belongs to the
/// host; only the content is decided here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    FloatingControl { label: String, title: String },
    Notification { message: String, kind: NotificationKind },
    /// Off-screen editable text used by the legacy copy technique.
    ScratchText { value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document has no body")]
    NoBody,
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("DOM operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard permission denied")]
    PermissionDenied,
    #[error("Clipboard unavailable in an insecure context")]
    InsecureContext,
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

impl Element {
    pub fn is_notification(&self) -> bool {
        matches!(self, Element::Notification { .. })
    }

    pub fn is_floating_control(&self) -> bool {
        matches!(self, Element::FloatingControl { .. })
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        })
    }
}
