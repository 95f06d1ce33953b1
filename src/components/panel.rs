use crate::components::clipboard::{CopyOutcome, copy_text};
use crate::components::gateway::{CookieFilter, CookieGateway, GatewayError};
use crate::components::snapshot::CookieSnapshot;
use crate::domain::models::cookie_models::{Cookie, SameSite, SetCookieDetails};
use crate::domain::models::page_models::NotificationKind;
use crate::domain::models::tab_models::TabContext;
use crate::domain::traits::page_traits::{Clipboard, ConfirmDialog, Document};
use crate::service::config::PanelConfig;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const HINT_IDLE: &str = "Click to copy";
const HINT_COPIED: &str = "Copied!";

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("{0}")]
    Validation(String),
    #[error("No usable tab: {0}")]
    MissingContext(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
}

/// Raw values of the set-cookie form, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieForm {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expiry_days: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFormat {
    Simple,
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyReport {
    NoCookies,
    Copied { count: usize, outcome: CopyOutcome },
    /// Both clipboard paths failed; the text is on display for manual copy.
    ManualCopyRequired { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearReport {
    NoCookies,
    Cancelled,
    /// `missing` counts cookies that were already gone from the store when
    /// their removal ran.
    Cleared {
        removed: usize,
        missing: usize,
        failed: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub hint: &'static str,
}

/// The popup. Lives only while its window is open: everything it shows is
/// fetched on open and thrown away by `close`.
pub struct InteractivePanel {
    gateway: Arc<CookieGateway>,
    document: Arc<dyn Document>,
    clipboard: Arc<dyn Clipboard>,
    config: PanelConfig,
    domain: String,
    snapshot: CookieSnapshot,
    list_visible: bool,
    form_visible: bool,
    form: CookieForm,
    status: Option<StatusBanner>,
    manual_copy: Option<String>,
    copied_hint: Option<(String, Instant)>,
}

impl CookieForm {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }
}

impl Default for CookieForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            path: "/".to_string(),
            expiry_days: "30".to_string(),
            secure: false,
            http_only: false,
            same_site: "lax".to_string(),
        }
    }
}

impl InteractivePanel {
    pub fn new(
        gateway: Arc<CookieGateway>,
        document: Arc<dyn Document>,
        clipboard: Arc<dyn Clipboard>,
        config: PanelConfig,
    ) -> Self {
        Self {
            gateway,
            document,
            clipboard,
            config,
            domain: String::new(),
            snapshot: CookieSnapshot::empty(),
            list_visible: false,
            form_visible: false,
            form: CookieForm::default(),
            status: None,
            manual_copy: None,
            copied_hint: None,
        }
    }

    pub async fn open(&mut self) -> Result<usize, PanelError> {
        self.refresh().await
    }

    /// Consumes the panel; nothing it built survives.
    pub fn close(self) {
        debug!(domain = %self.domain, "panel closed");
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn snapshot(&self) -> &CookieSnapshot {
        &self.snapshot
    }

    /// The banner while it is still within its display window.
    pub fn status(&self) -> Option<&StatusBanner> {
        self.status
            .as_ref()
            .filter(|banner| banner.shown_at.elapsed() < self.config.status_ttl)
    }

    /// Text left on display after a failed copy.
    pub fn manual_copy_text(&self) -> Option<&str> {
        self.manual_copy.as_deref()
    }

    pub fn list_visible(&self) -> bool {
        self.list_visible
    }

    pub fn form_visible(&self) -> bool {
        self.form_visible
    }

    pub fn form(&self) -> &CookieForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CookieForm {
        &mut self.form
    }

    /// Rebuilds the snapshot from the store for whatever tab is active now.
    pub async fn refresh(&mut self) -> Result<usize, PanelError> {
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                Ok(self.snapshot.len())
            }
            Err(e) => {
                warn!("failed to load cookies: {e}");
                self.snapshot = CookieSnapshot::empty();
                self.show_status(format!("Failed to load cookies: {e}"), NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Re-syncs domain and count after a tab switch, if the popup is showing.
    pub async fn on_tab_activated(&mut self, visible: bool) -> Result<(), PanelError> {
        if !visible {
            return Ok(());
        }
        self.refresh().await.map(|_| ())
    }

    pub async fn copy_simple(&mut self) -> Result<CopyReport, PanelError> {
        self.copy_snapshot(CopyFormat::Simple).await
    }

    pub async fn copy_detailed(&mut self) -> Result<CopyReport, PanelError> {
        self.copy_snapshot(CopyFormat::Detailed).await
    }

    pub async fn copy_snapshot(&mut self, format: CopyFormat) -> Result<CopyReport, PanelError> {
        let count = self.refresh().await?;
        if count == 0 {
            self.show_status("No cookies on this page", NotificationKind::Info);
            return Ok(CopyReport::NoCookies);
        }

        let text = match format {
            CopyFormat::Simple => self.snapshot.to_simple_string(),
            CopyFormat::Detailed => self.snapshot.to_detailed_string(),
        };

        let outcome = self.copy(&text).await;
        if !outcome.is_copied() {
            self.show_status("Copy failed, please copy manually", NotificationKind::Error);
            self.manual_copy = Some(text);
            return Ok(CopyReport::ManualCopyRequired { count });
        }

        let message = match format {
            CopyFormat::Simple => format!("Copied {count} cookies to the clipboard"),
            CopyFormat::Detailed => format!("Copied details of {count} cookies"),
        };
        self.show_status(message, NotificationKind::Success);
        self.manual_copy = None;
        Ok(CopyReport::Copied { count, outcome })
    }

    /// Shows or hides the per-cookie list. Stays as it is when there is
    /// nothing to list.
    pub async fn toggle_list(&mut self) -> Result<bool, PanelError> {
        let count = self.refresh().await?;
        if count == 0 {
            self.show_status("No cookies on this page", NotificationKind::Info);
            return Ok(self.list_visible);
        }

        self.list_visible = !self.list_visible;
        Ok(self.list_visible)
    }

    pub fn list_entries(&self) -> Vec<ListEntry> {
        if !self.list_visible {
            return Vec::new();
        }

        self.snapshot
            .cookies()
            .iter()
            .map(|cookie| ListEntry {
                name: cookie.name.clone(),
                hint: self.hint_for(&cookie.name),
            })
            .collect()
    }

    /// Copies one `name=value` pair from the list.
    pub async fn copy_entry(&mut self, name: &str) -> Result<CopyOutcome, PanelError> {
        let pair = self
            .snapshot
            .get(name)
            .map(Cookie::pair)
            .ok_or_else(|| PanelError::Validation(format!("No cookie named {name}")))?;

        let outcome = self.copy(&pair).await;
        if outcome.is_copied() {
            self.show_status(format!("Copied: {name}"), NotificationKind::Success);
            self.copied_hint = Some((name.to_string(), Instant::now()));
        } else {
            self.show_status("Copy failed", NotificationKind::Error);
        }
        Ok(outcome)
    }

    /// Removes every cookie of the snapshot after the user confirms.
    pub async fn clear_all(&mut self, dialog: &dyn ConfirmDialog) -> Result<ClearReport, PanelError> {
        let count = self.refresh().await?;
        if count == 0 {
            self.show_status("No cookies on this page", NotificationKind::Info);
            return Ok(ClearReport::NoCookies);
        }

        let prompt = format!(
            "Clear {count} cookies for {}?\n\nThis cannot be undone.",
            self.domain
        );
        if !dialog.confirm(&prompt).await {
            return Ok(ClearReport::Cancelled);
        }

        let mut removed = 0;
        let mut missing = 0;
        let mut first_error: Option<GatewayError> = None;
        for cookie in self.snapshot.cookies() {
            match self
                .gateway
                .remove_cookie(&cookie.domain, &cookie.path, cookie.secure, &cookie.name)
                .await
            {
                Ok(true) => removed += 1,
                Ok(false) => {
                    debug!(name = %cookie.name, "cookie already gone");
                    missing += 1;
                }
                Err(e) => {
                    warn!(name = %cookie.name, "failed to remove cookie: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        self.snapshot = CookieSnapshot::empty();
        self.list_visible = false;
        self.copied_hint = None;

        let failed = count - removed - missing;
        let mut message = match &first_error {
            None => format!("Cleared {removed} cookies"),
            Some(e) => format!("Cleared {removed} of {count} cookies: {e}"),
        };
        if missing > 0 {
            message.push_str(&format!(" ({missing} already gone)"));
        }
        let kind = match first_error {
            None => NotificationKind::Success,
            Some(_) => NotificationKind::Error,
        };
        self.show_status(message, kind);

        Ok(ClearReport::Cleared {
            removed,
            missing,
            failed,
        })
    }

    /// Shows or hides the set-cookie form. Hiding discards the draft.
    pub fn toggle_form(&mut self) -> bool {
        if self.form_visible {
            self.cancel_form();
        } else {
            self.form_visible = true;
        }
        self.form_visible
    }

    pub fn cancel_form(&mut self) {
        self.form_visible = false;
        self.form = CookieForm::default();
    }

    /// Writes the drafted cookie for the active tab's URL.
    pub async fn submit_form(&mut self) -> Result<Cookie, PanelError> {
        let details = match self.build_details().await {
            Ok(details) => details,
            Err(e) => {
                self.show_status(e.to_string(), NotificationKind::Error);
                return Err(e);
            }
        };
        let name = details.name.clone();

        match self.gateway.set_cookie(details).await {
            Ok(cookie) => {
                self.cancel_form();
                if let Err(e) = self.refresh().await {
                    debug!("refresh after set failed: {e}");
                }
                self.show_status(
                    format!("Cookie \"{name}\" saved"),
                    NotificationKind::Success,
                );
                Ok(cookie)
            }
            Err(e) => {
                self.show_status(format!("Failed to set cookie: {e}"), NotificationKind::Error);
                Err(e.into())
            }
        }
    }

    async fn build_details(&self) -> Result<SetCookieDetails, PanelError> {
        let form = &self.form;
        let name = form.name.trim();
        if name.is_empty() {
            return Err(PanelError::Validation("Cookie name is required".to_string()));
        }
        let value = form.value.trim();
        if value.is_empty() {
            return Err(PanelError::Validation("Cookie value is required".to_string()));
        }

        let path = match form.path.trim() {
            "" => self.config.default_path.clone(),
            path => path.to_string(),
        };
        let expiry_days =
            leading_days(&form.expiry_days).unwrap_or(self.config.default_expiry_days);
        let same_site = SameSite::parse(&form.same_site).unwrap_or(SameSite::Lax);

        let tab = self
            .gateway
            .active_tab()
            .await?
            .ok_or_else(|| PanelError::MissingContext("no active tab".to_string()))?;
        let url = tab
            .page_url()
            .ok_or_else(|| PanelError::MissingContext("active tab has no URL".to_string()))?;

        let expiration = chrono::Utc::now().timestamp() + i64::from(expiry_days) * SECONDS_PER_DAY;

        let details = SetCookieDetails {
            url: url.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: Some(path),
            secure: form.secure,
            http_only: form.http_only,
            same_site: Some(same_site),
            expiration_date: Some(expiration as f64),
        };
        Ok(details.enforce_same_site_invariant())
    }

    async fn fetch_snapshot(&mut self) -> Result<CookieSnapshot, PanelError> {
        let tab = self
            .gateway
            .active_tab()
            .await?
            .ok_or_else(|| PanelError::MissingContext("no active tab".to_string()))?;
        let context =
            TabContext::from_tab(&tab).map_err(|e| PanelError::MissingContext(e.to_string()))?;
        self.domain = context.domain.clone();

        let domain_matches = self
            .gateway
            .list_cookies(CookieFilter::Domain(context.domain))
            .await?;
        let url_matches = self
            .gateway
            .list_cookies(CookieFilter::Url(context.url))
            .await?;

        Ok(CookieSnapshot::merge(
            domain_matches,
            url_matches,
            self.config.precedence,
        ))
    }

    async fn copy(&self, text: &str) -> CopyOutcome {
        copy_text(
            self.clipboard.as_ref(),
            self.document.as_ref(),
            text,
            self.config.copy_timeout,
        )
        .await
    }

    fn hint_for(&self, name: &str) -> &'static str {
        match &self.copied_hint {
            Some((copied, at))
                if copied == name && at.elapsed() < self.config.copied_hint_ttl =>
            {
                HINT_COPIED
            }
            _ => HINT_IDLE,
        }
    }

    fn show_status(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.status = Some(StatusBanner {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }
}

/// Whole days from the leading digits of the field, so `10abc` reads as 10.
/// Zero, negative or digit-less input yields `None`.
fn leading_days(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());

    raw[..end].parse::<u32>().ok().filter(|days| *days > 0)
}
