//! Prometheus metrics HTTP server.
//!
//! Serves metrics on a configurable HTTP endpoint.

use crate::metrics::MetricsCollector;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use prometheus_client::encoding::text::encode;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

const OPENMETRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus metrics HTTP server.
pub struct MetricsServer {
    listener: TcpListener,
    path: String,
    collector: MetricsCollector,
}

impl MetricsServer {
    /// Bind the metrics listener.
    pub async fn bind(
        address: SocketAddr,
        path: String,
        collector: MetricsCollector,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            listener,
            path,
            collector,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if let Ok(address) = self.listener.local_addr() {
            info!(address = %address, path = %self.path, "metrics server started");
        }

        let collector = Arc::new(self.collector);
        let path = Arc::new(self.path);

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, _addr)) => {
                            let collector = Arc::clone(&collector);
                            let path = Arc::clone(&path);

                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req| {
                                    let collector = Arc::clone(&collector);
                                    let path = Arc::clone(&path);
                                    async move { handle_request(req, &collector, &path).await }
                                });

                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    debug!(error = %e, "metrics connection error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept metrics connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("metrics server shutting down");
                    break;
                }
            }
        }
    }
}

/// Handle an incoming metrics request.
async fn handle_request<B>(
    req: Request<B>,
    collector: &MetricsCollector,
    metrics_path: &str,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();
    debug!(path = %path, method = %req.method(), "metrics request");

    if req.method() != Method::GET {
        return Ok(text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n"));
    }

    let response = if path == metrics_path {
        let mut buffer = String::new();
        match encode(&mut buffer, collector.registry()) {
            Ok(()) => {
                let mut response = text_response(StatusCode::OK, buffer);
                if let Ok(value) = OPENMETRICS_CONTENT_TYPE.parse() {
                    response.headers_mut().insert(CONTENT_TYPE, value);
                }
                response
            }
            Err(e) => {
                error!(error = %e, "failed to encode metrics");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics\n")
            }
        }
    } else if path == "/health" || path == "/healthz" {
        text_response(StatusCode::OK, "OK\n")
    } else if path == "/" {
        text_response(
            StatusCode::OK,
            format!(
                "sitewatch metrics server\n\nEndpoints:\n  {} - Prometheus metrics\n  /health - Health check\n",
                metrics_path
            ),
        )
    } else {
        text_response(StatusCode::NOT_FOUND, "Not found\n")
    };

    Ok(response)
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn get(path: &str, collector: &MetricsCollector) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(())
            .unwrap();
        let response = handle_request(req, collector, "/metrics").await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let collector = MetricsCollector::new();
        collector.record_alert(true);

        let (status, body) = get("/metrics", &collector).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("sitewatch_alerts"));
        assert!(body.contains("sitewatch_rounds"));
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let collector = MetricsCollector::new();
        assert_eq!(get("/health", &collector).await.0, StatusCode::OK);
        assert_eq!(get("/nope", &collector).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_post() {
        let collector = MetricsCollector::new();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/metrics")
            .body(())
            .unwrap();
        let response = handle_request(req, &collector, "/metrics").await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_bind_ephemeral() {
        let server = MetricsServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            "/metrics".to_string(),
            MetricsCollector::new(),
        )
        .await
        .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
