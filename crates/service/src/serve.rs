//! Serve loop: feeds one request at a time from the channel into the
//! dispatcher and hands the reply back.

use std::sync::Arc;

use fahrplan_core::Dispatcher;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::channel::ReplyChannel;
use crate::error::ServiceError;

/// Runs the dispatcher against a bound reply channel.
///
/// Each iteration receives one request, produces exactly one reply, and
/// hands it back before the next request is accepted — no pipelining.
/// The loop ends when `shutdown` is notified; the bound socket closes
/// when the channel is dropped.
pub struct EventService<C: ReplyChannel> {
    channel: C,
    dispatcher: Dispatcher,
}

impl<C: ReplyChannel> EventService<C> {
    pub fn new(channel: C, dispatcher: Dispatcher) -> Self {
        Self {
            channel,
            dispatcher,
        }
    }

    /// Process requests until shutdown is notified.
    pub async fn run(mut self, shutdown: Arc<Notify>) -> Result<(), ServiceError> {
        info!("ready to accept requests");
        loop {
            let payload = tokio::select! {
                result = self.channel.recv_request() => result?,
                _ = shutdown.notified() => {
                    info!(
                        events_created = self.dispatcher.events_created(),
                        "shutdown requested, leaving serve loop"
                    );
                    return Ok(());
                }
            };

            let reply = self.dispatcher.dispatch(&payload);
            let reply_json = match serde_json::to_string(&reply) {
                Ok(json) => json,
                Err(e) => {
                    // Replies are plain data structs; encoding only fails
                    // if that ever stops being true.
                    warn!(error = %e, "failed to encode reply");
                    r#"{"status":"error","message":"internal encoding failure"}"#.to_string()
                }
            };
            self.channel.send_reply(reply_json).await?;
        }
    }
}
