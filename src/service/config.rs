use crate::service::service_runtime::InitError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tokio: TokioConfig,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
    pub controller: ControllerConfig,
    pub overlay: OverlayConfig,
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokioConfig {
    pub worker_threads: Option<usize>,
    pub thread_stack_size: Option<usize>,
    pub thread_name_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upper bound for a single cookie-store or tab-query call.
    pub call_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Extension-relative page opened on first install.
    pub welcome_page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub control_label: String,
    pub control_title: String,
    pub notification_ttl: Duration,
    pub fade_duration: Duration,
    pub copy_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub default_path: String,
    pub default_expiry_days: u32,
    pub status_ttl: Duration,
    pub copied_hint_ttl: Duration,
    pub copy_timeout: Duration,
    pub precedence: SnapshotPrecedence,
}

/// Which query wins when the exact-hostname and full-URL lookups both
/// return a cookie with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPrecedence {
    #[default]
    DomainExactWins,
    UrlMatchWins,
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self, InitError> {
        serde_json::from_str(json).map_err(|e| InitError::Configuration(e.to_string()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: "cookie_copier=info".to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            welcome_page: Some("welcome.html".to_string()),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            control_label: "🍪".to_string(),
            control_title: "Click to copy cookies".to_string(),
            notification_ttl: Duration::from_secs(3),
            fade_duration: Duration::from_millis(300),
            copy_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            default_path: "/".to_string(),
            default_expiry_days: 30,
            status_ttl: Duration::from_secs(3),
            copied_hint_ttl: Duration::from_secs(1),
            copy_timeout: Duration::from_secs(5),
            precedence: SnapshotPrecedence::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json(
            r#"{"gateway": {"call_timeout": {"secs": 2, "nanos": 0}},
                "panel": {"precedence": "url_match_wins"}}"#,
        )
        .unwrap();

        assert_eq!(config.gateway.call_timeout, Duration::from_secs(2));
        assert_eq!(config.panel.precedence, SnapshotPrecedence::UrlMatchWins);
        assert_eq!(config.panel.default_expiry_days, 30);
        assert_eq!(config.overlay.notification_ttl, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        assert!(matches!(
            RuntimeConfig::from_json("{"),
            Err(InitError::Configuration(_))
        ));
    }
}
