use crate::domain::models::page_models::{DocumentError, Element};
use crate::domain::traits::page_traits::{Clipboard, Document};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Which path a copy took, or why it did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The async clipboard API accepted the text.
    Native,
    /// The async API failed; the legacy copy command succeeded.
    Legacy,
    /// Both paths ran; the legacy command reported `false`.
    Refused,
    /// Both paths failed; the legacy path raised this error.
    Failed(String),
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyOutcome::Native | CopyOutcome::Legacy)
    }
}

/// Two-tier copy: the async clipboard first, then the legacy selection
/// technique in `document`. Never retries either path.
pub async fn copy_text(
    clipboard: &dyn Clipboard,
    document: &dyn Document,
    text: &str,
    native_timeout: Duration,
) -> CopyOutcome {
    match timeout(native_timeout, clipboard.write_text(text)).await {
        Ok(Ok(())) => return CopyOutcome::Native,
        Ok(Err(e)) => debug!("async clipboard write failed, using legacy copy: {e}"),
        Err(_) => warn!("async clipboard write timed out after {native_timeout:?}"),
    }

    match legacy_copy(document, text) {
        Ok(true) => CopyOutcome::Legacy,
        Ok(false) => CopyOutcome::Refused,
        Err(e) => {
            warn!("legacy copy failed: {e}");
            CopyOutcome::Failed(e.to_string())
        }
    }
}

/// Off-screen scratch element, select, copy command, remove. The scratch
/// element never outlives the call.
pub fn legacy_copy(document: &dyn Document, text: &str) -> Result<bool, DocumentError> {
    let id = document.append(Element::ScratchText {
        value: text.to_string(),
    })?;

    let copied = document.select(&id).and_then(|_| document.exec_copy());
    document.remove(&id);
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::page_models::ClipboardError;
    use crate::infrastructure::{ClipboardMode, ExecCopyBehavior, MemoryClipboard, MemoryDocument};
    use async_trait::async_trait;

    const WAIT: Duration = Duration::from_secs(1);

    /// A clipboard whose permission prompt is never answered.
    struct Unanswered;

    #[async_trait]
    impl Clipboard for Unanswered {
        async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_native_path() {
        let clipboard = MemoryClipboard::new(ClipboardMode::Allow);
        let document = MemoryDocument::new("example.com", "");

        let outcome = copy_text(&clipboard, &document, "a=1", WAIT).await;
        assert_eq!(outcome, CopyOutcome::Native);
        assert_eq!(clipboard.contents().await.as_deref(), Some("a=1"));
        assert!(document.copied().is_empty());
    }

    #[tokio::test]
    async fn test_denied_falls_back_to_legacy() {
        let clipboard = MemoryClipboard::new(ClipboardMode::Deny);
        let document = MemoryDocument::new("example.com", "");

        let outcome = copy_text(&clipboard, &document, "a=1", WAIT).await;
        assert_eq!(outcome, CopyOutcome::Legacy);
        assert_eq!(document.copied(), vec!["a=1".to_string()]);
        assert!(document.rendered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_native_write_falls_back_to_legacy() {
        let document = MemoryDocument::new("example.com", "");

        let outcome = copy_text(&Unanswered, &document, "a=1", WAIT).await;
        assert_eq!(outcome, CopyOutcome::Legacy);
        assert_eq!(document.copied(), vec!["a=1".to_string()]);
        assert!(document.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_both_paths_fail() {
        let clipboard = MemoryClipboard::new(ClipboardMode::Insecure);
        let document = MemoryDocument::new("example.com", "");

        document.set_exec_copy(ExecCopyBehavior::Refuse);
        assert_eq!(
            copy_text(&clipboard, &document, "a=1", WAIT).await,
            CopyOutcome::Refused
        );

        document.set_exec_copy(ExecCopyBehavior::Fail);
        let outcome = copy_text(&clipboard, &document, "a=1", WAIT).await;
        assert!(matches!(outcome, CopyOutcome::Failed(_)));
        assert!(!outcome.is_copied());
        assert!(document.rendered().is_empty());
    }
}
