use crate::adapters::bus::message_bus::{Disposition, MessageListener, Responder};
use crate::components::gateway::{CookieFilter, CookieGateway};
use crate::domain::models::message_models::{ControllerRequest, Response};
use crate::domain::models::tab_models::{InstallReason, Tab, TabContext};
use crate::domain::traits::tab_traits::{ExtensionHost, TabQuery};
use crate::service::config::ControllerConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const CLIPBOARD_UNAVAILABLE: &str =
    "Clipboard is not available in the background; copy from the popup or the page";
const NO_ACTIVE_TAB: &str = "Unable to resolve the active tab";
const EXTERNAL_UNSUPPORTED: &str = "External messages are not supported";

/// Background message broker.
///
/// The host may tear the controller down between any two messages, so it
/// keeps nothing but handles: every answer is rebuilt from the cookie store
/// and the tab query at the time of the request.
pub struct Controller {
    gateway: Arc<CookieGateway>,
    tabs: Arc<dyn TabQuery>,
    extension: Arc<dyn ExtensionHost>,
    config: ControllerConfig,
}

impl Controller {
    pub fn new(
        gateway: Arc<CookieGateway>,
        tabs: Arc<dyn TabQuery>,
        extension: Arc<dyn ExtensionHost>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            gateway,
            tabs,
            extension,
            config,
        }
    }

    pub async fn on_installed(&self, reason: InstallReason) {
        match reason {
            InstallReason::Install => {
                info!("first install");
                let Some(page) = self.config.welcome_page.as_deref() else {
                    return;
                };
                let url = self.extension.resource_url(page);
                if let Err(e) = self.tabs.create(&url).await {
                    warn!("welcome page unavailable, skipping: {e}");
                }
            }
            InstallReason::Update => {
                info!(version = %self.extension.manifest_version(), "extension updated");
            }
            other => debug!(?other, "install event ignored"),
        }
    }

    pub async fn handle(&self, request: ControllerRequest) -> Response {
        debug!(action = request.action(), "controller request");

        match request {
            ControllerRequest::GetCookies { domain, url } => {
                match self
                    .gateway
                    .list_cookies(CookieFilter::from_parts(domain, url))
                    .await
                {
                    Ok(cookies) => Response::cookies(cookies),
                    Err(e) => {
                        warn!("failed to list cookies: {e}");
                        Response::failure(e.to_string())
                    }
                }
            }
            ControllerRequest::GetTabInfo => match self.gateway.active_tab().await {
                Ok(Some(tab)) => match TabContext::from_tab(&tab) {
                    Ok(context) => Response::tab(context),
                    Err(e) => Response::failure(e.to_string()),
                },
                Ok(None) => Response::failure(NO_ACTIVE_TAB),
                Err(e) => {
                    warn!("failed to query the active tab: {e}");
                    Response::failure(e.to_string())
                }
            },
            ControllerRequest::CopyToClipboard { .. } => Response::failure(CLIPBOARD_UNAVAILABLE),
        }
    }

    pub fn on_external_message(&self, message: &Value) -> Response {
        debug!(%message, "external message rejected");
        Response::failure(EXTERNAL_UNSUPPORTED)
    }

    pub fn on_tab_updated(&self, tab: &Tab, load_complete: bool) {
        if load_complete {
            if let Some(url) = tab.page_url() {
                debug!(tab = tab.id, %url, "tab finished loading");
            }
        }
    }

    pub fn on_tab_activated(&self, tab_id: i64) {
        debug!(tab = tab_id, "tab activated");
    }

    pub fn on_suspend(&self) {
        info!("controller suspending");
    }
}

impl MessageListener for Controller {
    fn on_message(self: Arc<Self>, message: Value, responder: Responder) -> Disposition {
        let Some((request, responder)) = responder.accept::<ControllerRequest>(&message) else {
            return Disposition::Responded;
        };

        let action = request.action();
        responder.reply_later(action, async move { self.handle(request).await })
    }
}
