#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Unknown message type: {0}")]
    UnknownAction(String),
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("No async runtime to handle {0}")]
    NoRuntime(String),
    #[error("Response channel closed before a reply was sent")]
    ChannelClosed,
}
