use crate::domain::models::cookie_models::Cookie;
use crate::domain::models::tab_models::TabContext;
use serde::{Deserialize, Serialize};

/// Messages the background controller answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControllerRequest {
    GetCookies {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    GetTabInfo,
    CopyToClipboard {
        #[serde(default)]
        text: String,
    },
}

/// Messages the in-page overlay answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    GetCookies,
    ShowFloatingButton,
    HideFloatingButton,
    CopyPageCookies,
}

/// Every reply on the bus carries `success`; the remaining fields depend on
/// the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Cookies {
        success: bool,
        cookies: Vec<Cookie>,
        count: usize,
    },
    Tab {
        success: bool,
        tab: TabContext,
    },
    PageCookies {
        success: bool,
        cookies: String,
        domain: String,
    },
    Failure {
        success: bool,
        error: String,
    },
    Ack {
        success: bool,
    },
}

impl ControllerRequest {
    pub fn action(&self) -> &'static str {
        match self {
            ControllerRequest::GetCookies { .. } => "getCookies",
            ControllerRequest::GetTabInfo => "getTabInfo",
            ControllerRequest::CopyToClipboard { .. } => "copyToClipboard",
        }
    }
}

impl PageRequest {
    pub fn action(&self) -> &'static str {
        match self {
            PageRequest::GetCookies => "getCookies",
            PageRequest::ShowFloatingButton => "showFloatingButton",
            PageRequest::HideFloatingButton => "hideFloatingButton",
            PageRequest::CopyPageCookies => "copyPageCookies",
        }
    }
}

impl Response {
    pub fn cookies(cookies: Vec<Cookie>) -> Self {
        let count = cookies.len();
        Response::Cookies {
            success: true,
            cookies,
            count,
        }
    }

    pub fn tab(tab: TabContext) -> Self {
        Response::Tab { success: true, tab }
    }

    pub fn page_cookies(cookies: String, domain: String) -> Self {
        Response::PageCookies {
            success: true,
            cookies,
            domain,
        }
    }

    pub fn ack() -> Self {
        Response::Ack { success: true }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Response::Failure {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Cookies { success, .. }
            | Response::Tab { success, .. }
            | Response::PageCookies { success, .. }
            | Response::Failure { success, .. }
            | Response::Ack { success } => *success,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Response::Failure { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_controller_request_tags() {
        let request: ControllerRequest =
            serde_json::from_value(json!({"action": "getCookies", "domain": "example.com"}))
                .unwrap();
        assert_eq!(
            request,
            ControllerRequest::GetCookies {
                domain: Some("example.com".to_string()),
                url: None
            }
        );

        let request: ControllerRequest =
            serde_json::from_value(json!({"action": "getTabInfo"})).unwrap();
        assert_eq!(request, ControllerRequest::GetTabInfo);

        assert!(serde_json::from_value::<ControllerRequest>(json!({"action": "explode"})).is_err());
        assert!(
            serde_json::from_value::<ControllerRequest>(json!({"action": "showFloatingButton"}))
                .is_err()
        );
    }

    #[test]
    fn test_page_request_tags() {
        let request: PageRequest =
            serde_json::from_value(json!({"action": "hideFloatingButton"})).unwrap();
        assert_eq!(request, PageRequest::HideFloatingButton);
        assert_eq!(request.action(), "hideFloatingButton");
    }

    #[test]
    fn test_response_shapes() {
        let value = serde_json::to_value(Response::cookies(vec![])).unwrap();
        assert_eq!(value, json!({"success": true, "cookies": [], "count": 0}));

        let value = serde_json::to_value(Response::failure("nope")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "nope"}));

        let value = serde_json::to_value(Response::ack()).unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[test]
    fn test_response_parses_back_to_variant() {
        let response: Response =
            serde_json::from_value(json!({"success": false, "error": "x"})).unwrap();
        assert!(matches!(response, Response::Failure { .. }));
        assert!(!response.is_success());

        let response: Response = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(response, Response::ack());
    }
}
