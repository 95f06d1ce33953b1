use crate::adapters::bus::message_bus::{Disposition, MessageListener, Responder};
use crate::components::clipboard::{CopyOutcome, copy_text};
use crate::domain::models::message_models::{PageRequest, Response};
use crate::domain::models::page_models::{DocumentError, Element, ElementId, NotificationKind};
use crate::domain::traits::page_traits::{Clipboard, Document};
use crate::service::config::OverlayConfig;
use crate::utils::url_component::decode_component;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lazy_static::lazy_static;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

lazy_static! {
    // One agent per page load, keyed by `Document::instance_id`. Entries are
    // only created by `PageOverlayAgent::inject` and only dropped by
    // `PageOverlayAgent::unload`.
    static ref INJECTED_PAGES: DashMap<String, Arc<PageOverlayAgent>> = DashMap::new();
}

pub enum Injection {
    Fresh(Arc<PageOverlayAgent>),
    /// The page already had an agent; nothing new was created.
    AlreadyInjected(Arc<PageOverlayAgent>),
}

/// Result of copying the page's own cookie string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCopy {
    NoCookies,
    Copied { pairs: usize, outcome: CopyOutcome },
    Failed(CopyOutcome),
}

/// In-page agent: floating copy control, notifications and the page side
/// of the message protocol.
pub struct PageOverlayAgent {
    document: Arc<dyn Document>,
    clipboard: Arc<dyn Clipboard>,
    config: OverlayConfig,
    state: AsyncMutex<OverlayState>,
}

#[derive(Default)]
struct OverlayState {
    control_visible: bool,
    floating_control: Option<ElementId>,
    notification: Option<ElementId>,
}

impl Injection {
    pub fn agent(&self) -> &Arc<PageOverlayAgent> {
        match self {
            Injection::Fresh(agent) | Injection::AlreadyInjected(agent) => agent,
        }
    }

    pub fn into_agent(self) -> Arc<PageOverlayAgent> {
        match self {
            Injection::Fresh(agent) | Injection::AlreadyInjected(agent) => agent,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Injection::Fresh(_))
    }
}

impl PageOverlayAgent {
    /// Creates the page's agent, or returns the existing one when the script
    /// is injected again into the same page load.
    pub fn inject(
        document: Arc<dyn Document>,
        clipboard: Arc<dyn Clipboard>,
        config: OverlayConfig,
    ) -> Injection {
        match INJECTED_PAGES.entry(document.instance_id()) {
            Entry::Occupied(existing) => {
                debug!(page = %existing.key(), "overlay already injected");
                Injection::AlreadyInjected(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                info!(host = %document.hostname(), "overlay injected");
                let agent = Arc::new(Self {
                    document,
                    clipboard,
                    config,
                    state: AsyncMutex::new(OverlayState::default()),
                });
                slot.insert(Arc::clone(&agent));
                Injection::Fresh(agent)
            }
        }
    }

    pub fn is_injected(instance_id: &str) -> bool {
        INJECTED_PAGES.contains_key(instance_id)
    }

    /// Page teardown: removes the floating control and frees the page's slot.
    pub async fn unload(&self) {
        self.hide_floating_control().await;
        INJECTED_PAGES.remove(&self.document.instance_id());
    }

    pub async fn is_control_visible(&self) -> bool {
        self.state.lock().await.control_visible
    }

    /// Returns true if a control was created by this call.
    pub async fn show_floating_control(&self) -> Result<bool, DocumentError> {
        let mut state = self.state.lock().await;
        if state.control_visible {
            return Ok(false);
        }

        let id = self.document.append(Element::FloatingControl {
            label: self.config.control_label.clone(),
            title: self.config.control_title.clone(),
        })?;
        state.floating_control = Some(id);
        state.control_visible = true;
        Ok(true)
    }

    /// Returns true if a control was removed by this call.
    pub async fn hide_floating_control(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.control_visible {
            return false;
        }

        if let Some(id) = state.floating_control.take() {
            self.document.remove(&id);
        }
        state.control_visible = false;
        true
    }

    /// Flips the control and tells the user which way it went.
    pub async fn toggle_floating_control(&self) -> Result<bool, DocumentError> {
        if self.hide_floating_control().await {
            self.notify("Floating button hidden", NotificationKind::Info).await?;
            return Ok(false);
        }

        self.show_floating_control().await?;
        self.notify("Floating button shown", NotificationKind::Info).await?;
        Ok(true)
    }

    /// Click on the floating control.
    pub async fn activate(&self) -> PageCopy {
        self.copy_page_cookies().await
    }

    pub async fn copy_page_cookies(&self) -> PageCopy {
        let cookies = self.document.cookie_string();
        if cookies.trim().is_empty() {
            self.notify_or_log("No cookies on this page", NotificationKind::Info).await;
            return PageCopy::NoCookies;
        }

        let outcome = copy_text(
            self.clipboard.as_ref(),
            self.document.as_ref(),
            &cookies,
            self.config.copy_timeout,
        )
        .await;

        if outcome.is_copied() {
            let pairs = parse_cookie_string(&cookies).len();
            self.notify_or_log(
                &format!("Copied {pairs} cookies to the clipboard!"),
                NotificationKind::Success,
            )
            .await;
            return PageCopy::Copied { pairs, outcome };
        }

        let message = match &outcome {
            CopyOutcome::Failed(reason) => format!("Copy failed: {reason}"),
            _ => "Copy failed, please copy manually".to_string(),
        };
        self.notify_or_log(&message, NotificationKind::Error).await;
        PageCopy::Failed(outcome)
    }

    /// Shows a transient notification, replacing any visible one. It fades
    /// after `notification_ttl` and leaves the page `fade_duration` later.
    pub async fn notify(
        &self,
        message: &str,
        kind: NotificationKind,
    ) -> Result<ElementId, DocumentError> {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.notification.take() {
            self.document.remove(&previous);
        }

        let id = self.document.append(Element::Notification {
            message: message.to_string(),
            kind,
        })?;
        state.notification = Some(id.clone());
        drop(state);

        self.schedule_dismissal(id.clone());
        Ok(id)
    }

    pub async fn handle(&self, request: PageRequest) -> Response {
        debug!(action = request.action(), "page request");

        match request {
            PageRequest::GetCookies => {
                Response::page_cookies(self.document.cookie_string(), self.document.hostname())
            }
            PageRequest::ShowFloatingButton => match self.show_floating_control().await {
                Ok(_) => Response::ack(),
                Err(e) => Response::failure(e.to_string()),
            },
            PageRequest::HideFloatingButton => {
                self.hide_floating_control().await;
                Response::ack()
            }
            PageRequest::CopyPageCookies => {
                self.copy_page_cookies().await;
                Response::ack()
            }
        }
    }

    async fn notify_or_log(&self, message: &str, kind: NotificationKind) {
        if let Err(e) = self.notify(message, kind).await {
            warn!("cannot show notification {message:?}: {e}");
        }
    }

    fn schedule_dismissal(&self, id: ElementId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no runtime to dismiss notification {id}");
            return;
        };

        let document = Arc::clone(&self.document);
        let ttl = self.config.notification_ttl;
        let fade = self.config.fade_duration;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if !document.contains(&id) {
                return;
            }
            document.fade_out(&id);
            tokio::time::sleep(fade).await;
            document.remove(&id);
        });
    }
}

impl MessageListener for PageOverlayAgent {
    fn on_message(self: Arc<Self>, message: Value, responder: Responder) -> Disposition {
        let Some((request, responder)) = responder.accept::<PageRequest>(&message) else {
            return Disposition::Responded;
        };

        let action = request.action();
        responder.reply_later(action, async move { self.handle(request).await })
    }
}

/// Splits a `document.cookie` string into percent-decoded `(name, value)`
/// pairs. Fragments without `=` are skipped.
pub fn parse_cookie_string(cookies: &str) -> Vec<(String, String)> {
    cookies
        .split(';')
        .filter_map(|fragment| fragment.trim().split_once('='))
        .map(|(name, value)| (name.trim().to_string(), decode_component(value.trim())))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
