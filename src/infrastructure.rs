//! In-memory hosts for every browser seam, so the protocol runs headless.
//! A bridge to the real extension APIs implements the same traits.

pub mod cookie;
pub mod page;
pub mod tab;

pub use cookie::cookie_backend::MemoryCookieStore;
pub use page::clipboard_backend::{ClipboardMode, MemoryClipboard, ScriptedConfirm};
pub use page::document_backend::{ExecCopyBehavior, MemoryDocument};
pub use tab::tab_backend::{MemoryTabs, StaticExtensionHost};
