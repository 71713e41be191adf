//! Alert dispatching.
//!
//! The monitor hands formatted alerts to an [`AlertDispatcher`]. Delivery
//! failures are reported back as [`DispatchError`] and never stop monitoring.

mod log;
mod message;
mod webhook;

pub use log::LogDispatcher;
pub use message::Alert;
pub use webhook::WebhookDispatcher;

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by an alert transport.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no recipient configured")]
    MissingRecipient,

    #[error("alert transport failed: {0}")]
    Transport(String),

    #[error("alert endpoint rejected the request with status {0}")]
    Rejected(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outbound notification transport.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DispatchError>;
}
