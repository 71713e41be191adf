//! Dispatcher that writes alerts to the log.

use crate::alert::{AlertDispatcher, DispatchError};
use async_trait::async_trait;
use tracing::warn;

/// Emits every alert as a `warn` event. Used when no transport is configured.
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DispatchError> {
        if recipient.is_empty() {
            return Err(DispatchError::MissingRecipient);
        }
        warn!(recipient = %recipient, subject = %subject, body = %body, "alert");
        Ok(())
    }
}
