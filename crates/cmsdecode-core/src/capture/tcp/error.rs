use thiserror::Error;

/// Errors returned while slicing a captured frame down to its TCP payload.
#[derive(Debug, Error)]
pub enum TcpError {
    #[error("packet slice error: {0}")]
    Slice(String),
    #[error("missing network layer in packet")]
    MissingNetworkLayer,
}
