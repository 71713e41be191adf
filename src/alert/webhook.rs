//! Dispatcher that POSTs alerts to an HTTP endpoint.

use crate::alert::{AlertDispatcher, DispatchError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    body: &'a str,
    recipient: &'a str,
}

/// Sends each alert as a JSON document to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    /// Create a dispatcher posting to `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AlertDispatcher for WebhookDispatcher {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DispatchError> {
        if recipient.is_empty() {
            return Err(DispatchError::MissingRecipient);
        }

        let payload = WebhookPayload {
            subject,
            body,
            recipient,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected(status.as_u16()));
        }

        debug!(url = %self.url, status = status.as_u16(), "alert delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accept one request, hand its raw bytes back, answer with `status_line`.
    async fn start_hook(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            // Read until the JSON body has closed.
            while let Ok(n) = stream.read(&mut buf).await {
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if received.ends_with(b"}") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status_line
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = tx.send(String::from_utf8_lossy(&received).into_owned());
        });

        (format!("http://{}/hook", addr), rx)
    }

    #[tokio::test]
    async fn test_webhook_delivers_payload() {
        let (url, received) = start_hook("200 OK").await;
        let dispatcher = WebhookDispatcher::new(url, Duration::from_secs(5)).unwrap();

        dispatcher
            .notify("ALERT: 1 target(s) down", "bad.example.com: timeout", "ops@example.com")
            .await
            .unwrap();

        let request = received.await.unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.contains("\"recipient\":\"ops@example.com\""));
        assert!(request.contains("bad.example.com: timeout"));
    }

    #[tokio::test]
    async fn test_webhook_rejected() {
        let (url, _received) = start_hook("500 Internal Server Error").await;
        let dispatcher = WebhookDispatcher::new(url, Duration::from_secs(5)).unwrap();

        let result = dispatcher.notify("subject", "body", "ops@example.com").await;
        assert!(matches!(result, Err(DispatchError::Rejected(500))));
    }

    #[tokio::test]
    async fn test_webhook_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher =
            WebhookDispatcher::new(format!("http://{}/hook", addr), Duration::from_secs(5)).unwrap();
        let result = dispatcher.notify("subject", "body", "ops@example.com").await;
        assert!(matches!(result, Err(DispatchError::Http(_))));
    }
}
