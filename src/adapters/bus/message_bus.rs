use crate::adapters::bus::errors::BusError;
use crate::domain::models::message_models::{ControllerRequest, PageRequest, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a listener did with the responder it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A reply was already sent.
    Responded,
    /// A reply will be sent later; the sender must keep the channel open.
    KeepOpen,
}

/// One-shot reply handle. Consumed on use, so a request gets at most one
/// response.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<Response>,
}

/// A closed set of actions a listener understands.
pub trait BusRequest: DeserializeOwned + Send + 'static {
    const ACTIONS: &'static [&'static str];
}

pub trait MessageListener: Send + Sync + 'static {
    fn on_message(self: Arc<Self>, message: Value, responder: Responder) -> Disposition;
}

impl BusRequest for ControllerRequest {
    const ACTIONS: &'static [&'static str] = &["getCookies", "getTabInfo", "copyToClipboard"];
}

impl BusRequest for PageRequest {
    const ACTIONS: &'static [&'static str] = &[
        "getCookies",
        "showFloatingButton",
        "hideFloatingButton",
        "copyPageCookies",
    ];
}

impl Responder {
    pub fn channel() -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Returns false if the sender stopped waiting.
    pub fn respond(self, response: Response) -> bool {
        self.tx.send(response).is_ok()
    }

    /// Sends what `reply` yields once it completes on the current runtime.
    /// Without a runtime the request fails at once.
    pub fn reply_later<F>(self, action: &str, reply: F) -> Disposition
    where
        F: Future<Output = Response> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            let e = BusError::NoRuntime(action.to_string());
            warn!("{e}");
            self.respond(Response::failure(e.to_string()));
            return Disposition::Responded;
        };

        handle.spawn(async move {
            if !self.respond(reply.await) {
                debug!("sender stopped waiting for the reply");
            }
        });
        Disposition::KeepOpen
    }

    /// Parses `message` into `T`. On failure the responder is spent on the
    /// failure response and `None` comes back.
    pub fn accept<T: BusRequest>(self, message: &Value) -> Option<(T, Self)> {
        match parse_request::<T>(message) {
            Ok(request) => Some((request, self)),
            Err(e) => {
                debug!("rejecting message: {e}");
                self.respond(Response::failure(e.to_string()));
                None
            }
        }
    }
}

pub fn parse_request<T: BusRequest>(message: &Value) -> Result<T, BusError> {
    let action = message
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| BusError::Malformed("missing action".to_string()))?;

    if !T::ACTIONS.contains(&action) {
        return Err(BusError::UnknownAction(action.to_string()));
    }

    serde_json::from_value(message.clone()).map_err(|e| BusError::Malformed(e.to_string()))
}

/// Sends `message` to `listener` and waits for its single reply.
pub async fn dispatch<L>(listener: &Arc<L>, message: Value) -> Result<Response, BusError>
where
    L: MessageListener + ?Sized,
{
    let (responder, reply) = Responder::channel();
    let disposition = Arc::clone(listener).on_message(message, responder);
    debug!(?disposition, "message delivered");

    reply.await.map_err(|_| BusError::ChannelClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl MessageListener for Echo {
        fn on_message(self: Arc<Self>, message: Value, responder: Responder) -> Disposition {
            let Some((request, responder)) = responder.accept::<PageRequest>(&message) else {
                return Disposition::Responded;
            };
            responder.reply_later(request.action(), async move {
                Response::failure(request.action())
            })
        }
    }

    struct Silent;

    impl MessageListener for Silent {
        fn on_message(self: Arc<Self>, _message: Value, responder: Responder) -> Disposition {
            drop(responder);
            Disposition::Responded
        }
    }

    #[test]
    fn test_parse_request_errors() {
        assert!(matches!(
            parse_request::<ControllerRequest>(&json!({"action": "nope"})),
            Err(BusError::UnknownAction(action)) if action == "nope"
        ));
        assert!(matches!(
            parse_request::<ControllerRequest>(&json!({"text": "x"})),
            Err(BusError::Malformed(_))
        ));
        assert!(matches!(
            parse_request::<ControllerRequest>(&json!({"action": "getCookies", "domain": 5})),
            Err(BusError::Malformed(_))
        ));
    }

    fn assert_actions_match<T: BusRequest>(action_of: fn(&T) -> &'static str, variants: &[T]) {
        for action in T::ACTIONS {
            let request = parse_request::<T>(&json!({ "action": action })).unwrap();
            assert_eq!(action_of(&request), *action);
        }
        for variant in variants {
            assert!(T::ACTIONS.contains(&action_of(variant)));
        }
        assert_eq!(T::ACTIONS.len(), variants.len());
    }

    #[test]
    fn test_action_lists_match_variants() {
        assert_actions_match(
            ControllerRequest::action,
            &[
                ControllerRequest::GetCookies {
                    domain: None,
                    url: None,
                },
                ControllerRequest::GetTabInfo,
                ControllerRequest::CopyToClipboard {
                    text: String::new(),
                },
            ],
        );
        assert_actions_match(
            PageRequest::action,
            &[
                PageRequest::GetCookies,
                PageRequest::ShowFloatingButton,
                PageRequest::HideFloatingButton,
                PageRequest::CopyPageCookies,
            ],
        );
    }

    #[test]
    fn test_reply_later_without_runtime_fails_at_once() {
        let (responder, mut reply) = Responder::channel();
        let disposition = responder.reply_later("getTabInfo", async { Response::ack() });

        assert_eq!(disposition, Disposition::Responded);
        let response = reply.try_recv().unwrap();
        assert_eq!(response.error(), Some("No async runtime to handle getTabInfo"));
    }

    #[tokio::test]
    async fn test_dispatch_waits_for_async_reply() {
        let listener = Arc::new(Echo);
        let response = dispatch(&listener, json!({"action": "copyPageCookies"}))
            .await
            .unwrap();
        assert_eq!(response.error(), Some("copyPageCookies"));
    }

    #[tokio::test]
    async fn test_unknown_action_answers_immediately() {
        let listener = Arc::new(Echo);
        let response = dispatch(&listener, json!({"action": "getTabInfo"})).await.unwrap();
        assert_eq!(response.error(), Some("Unknown message type: getTabInfo"));
    }

    #[tokio::test]
    async fn test_dropped_responder_closes_channel() {
        let listener = Arc::new(Silent);
        let result = dispatch(&listener, json!({"action": "x"})).await;
        assert!(matches!(result, Err(BusError::ChannelClosed)));
    }
}
