//! GatewayClient trait - the capability set the engine calls
//!
//! Every call is awaited to completion by the engine before the next one starts.
//! Timeouts are the client's responsibility and surface as `SendError::Transport`.

use crate::{Attachment, SendError};

/// Informational receipt of an accepted call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Gateway message id, if returned
    pub message_id: Option<String>,
}

/// Messaging gateway client
///
/// Implemented by the HTTP client and by test doubles.
#[trait_variant::make(GatewayClient: Send)]
pub trait LocalGatewayClient {
    /// Send a text message to one number
    async fn send_text(&self, number: &str, message: &str) -> Result<SendReceipt, SendError>;

    /// Send one file to one number
    async fn send_file(
        &self,
        number: &str,
        attachment: &Attachment,
    ) -> Result<SendReceipt, SendError>;

    /// Readiness probe, called once before a run
    ///
    /// `Ok(false)` means reachable but not paired/authenticated.
    async fn check_ready(&self) -> Result<bool, SendError>;
}
