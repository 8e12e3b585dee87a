use thiserror::Error;

/// Errors surfaced by the transport layer and process shell.
///
/// Dispatch failures never reach this type — the core answers those with
/// `status: "error"` replies instead of propagating them.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("zeromq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}
