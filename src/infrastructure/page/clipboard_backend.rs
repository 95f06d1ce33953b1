use crate::domain::models::page_models::ClipboardError;
use crate::domain::traits::page_traits::{Clipboard, ConfirmDialog};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Allow,
    Deny,
    Insecure,
}

/// System clipboard stand-in. Denial modes reproduce the failures the async
/// clipboard API raises in a page.
pub struct MemoryClipboard {
    mode: AsyncMutex<ClipboardMode>,
    contents: AsyncMutex<Option<String>>,
    attempts: AtomicUsize,
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match *self.mode.lock().await {
            ClipboardMode::Deny => Err(ClipboardError::PermissionDenied),
            ClipboardMode::Insecure => Err(ClipboardError::InsecureContext),
            ClipboardMode::Allow => {
                *self.contents.lock().await = Some(text.to_string());
                Ok(())
            }
        }
    }
}

impl MemoryClipboard {
    pub fn new(mode: ClipboardMode) -> Self {
        Self {
            mode: AsyncMutex::new(mode),
            contents: AsyncMutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    pub async fn set_mode(&self, mode: ClipboardMode) {
        *self.mode.lock().await = mode;
    }

    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new(ClipboardMode::Allow)
    }
}

/// Confirmation dialog with a preset answer that records every prompt.
pub struct ScriptedConfirm {
    answer: AtomicBool,
    prompts: AsyncMutex<Vec<String>>,
}

#[async_trait]
impl ConfirmDialog for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().await.push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            prompts: AsyncMutex::new(Vec::new()),
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_denied_clipboard_keeps_contents() {
        let clipboard = MemoryClipboard::new(ClipboardMode::Deny);
        assert!(matches!(
            clipboard.write_text("x").await,
            Err(ClipboardError::PermissionDenied)
        ));
        assert!(clipboard.contents().await.is_none());

        clipboard.set_mode(ClipboardMode::Allow).await;
        clipboard.write_text("y").await.unwrap();
        assert_eq!(clipboard.contents().await.as_deref(), Some("y"));
        assert_eq!(clipboard.attempts(), 2);
    }

    #[tokio::test]
    async fn test_confirm_records_prompt() {
        let dialog = ScriptedConfirm::new(false);
        assert!(!dialog.confirm("sure?").await);
        assert_eq!(dialog.prompts().await, vec!["sure?".to_string()]);
    }
}
