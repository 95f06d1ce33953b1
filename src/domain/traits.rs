pub mod cookie_traits;
pub mod page_traits;
pub mod tab_traits;

pub use cookie_traits::CookieStore;
pub use page_traits::{Clipboard, ConfirmDialog, Document};
pub use tab_traits::{ExtensionHost, TabQuery};
