pub mod channel;
pub mod config;
pub mod error;
pub mod serve;
pub mod transport;

pub use channel::{ReplyChannel, RequestChannel, ZmqReplyServer, ZmqRequestClient};
pub use config::{ServiceConfig, TransportConfig};
pub use error::ServiceError;
pub use serve::EventService;
pub use transport::Transport;
