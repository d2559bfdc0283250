//! Prometheus metrics for reconciliations and the HTTP endpoint that serves them

use anyhow::Result;
use hyper::body::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::tokio::TokioIo;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Outcome label of a reconciliation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
        }
    }
}

pub struct ReconcileMetrics {
    /// Reconciliations by kind and outcome
    pub reconciliations_total: CounterVec,
    /// Reconciliation latency by kind
    pub reconcile_duration_seconds: HistogramVec,
    registry: Registry,
}

impl ReconcileMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let reconciliations_total = CounterVec::new(
            Opts::new("reconciliations_total", "Total reconciliations of managed resources"),
            &["kind", "result"],
        )?;

        let reconcile_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "reconcile_duration_seconds",
                "Reconciliation latency in seconds",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(reconciliations_total.clone()))?;
        registry.register(Box::new(reconcile_duration_seconds.clone()))?;

        Ok(Self {
            reconciliations_total,
            reconcile_duration_seconds,
            registry,
        })
    }

    pub fn record(&self, kind: &str, outcome: Outcome, elapsed: Duration) {
        self.reconciliations_total
            .with_label_values(&[kind, outcome.as_str()])
            .inc();
        self.reconcile_duration_seconds
            .with_label_values(&[kind])
            .observe(elapsed.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Serve `/metrics` and `/healthz` until the process exits
pub async fn serve(addr: SocketAddr, metrics: Arc<ReconcileMetrics>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Error accepting metrics connection: {}", e);
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let metrics = metrics.clone();
                async move { Ok::<_, Infallible>(handle_request(&req, &metrics)) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Error serving metrics connection from {}: {}", peer_addr, e);
            }
        });
    }
}

fn handle_request<B>(req: &Request<B>, metrics: &ReconcileMetrics) -> Response<Full<Bytes>> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => match metrics.gather() {
            Ok(text) => Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(text))),
            Err(e) => {
                warn!("Failed to gather metrics: {}", e);
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("Failed to gather metrics\n")))
            }
        },
        (_, "/healthz") => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("OK\n"))),
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("Not Found\n"))),
    }
    .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder().method(method).uri(path).body(()).unwrap()
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_record_counts_by_kind_and_result() {
        let metrics = ReconcileMetrics::new().unwrap();
        metrics.record("VPC", Outcome::Success, Duration::from_millis(20));
        metrics.record("VPC", Outcome::Success, Duration::from_millis(30));
        metrics.record("Topic", Outcome::Error, Duration::from_millis(5));

        assert_eq!(
            metrics
                .reconciliations_total
                .with_label_values(&["VPC", "success"])
                .get(),
            2.0
        );
        assert_eq!(
            metrics
                .reconciliations_total
                .with_label_values(&["Topic", "error"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let metrics = ReconcileMetrics::new().unwrap();
        metrics.record("Subnet", Outcome::Success, Duration::from_millis(10));

        let response = handle_request(&request(Method::GET, "/metrics"), &metrics);
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        assert!(text.contains("reconciliations_total{kind=\"Subnet\",result=\"success\"} 1"));
        assert!(text.contains("reconcile_duration_seconds_count{kind=\"Subnet\"} 1"));
    }

    #[tokio::test]
    async fn test_healthz_and_unknown_paths() {
        let metrics = ReconcileMetrics::new().unwrap();

        let response = handle_request(&request(Method::GET, "/healthz"), &metrics);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK\n");

        let response = handle_request(&request(Method::GET, "/other"), &metrics);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
