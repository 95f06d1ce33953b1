pub mod cookie_models;
pub mod message_models;
pub mod page_models;
pub mod tab_models;

pub use cookie_models::{Cookie, CookieError, CookieKey, CookieQuery, SameSite, SetCookieDetails};
pub use message_models::{ControllerRequest, PageRequest, Response};
pub use page_models::{ClipboardError, DocumentError, Element, ElementId, NotificationKind};
pub use tab_models::{InstallReason, Tab, TabContext, TabError};
