//! HTTP endpoint exposing the exporter's registry
//!
//! Serves `GET /metrics` in Prometheus text format and `GET /health` for
//! liveness checks. The server stops when its cancellation token fires.

use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::metrics::ExporterMetrics;
use crate::{Error, Result};

/// Start the metrics server in the background
///
/// Binding happens before this returns, so a port conflict is reported to
/// the caller rather than inside the spawned task.
pub fn start_metrics_server(
    port: u16,
    metrics: ExporterMetrics,
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let make_service = hyper::service::make_service_fn(move |_conn| {
        let metrics = metrics.clone();
        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req| {
                let metrics = metrics.clone();
                async move { Ok::<_, Infallible>(handle_request(&metrics, req)) }
            }))
        }
    });

    let server = hyper::Server::try_bind(&addr)
        .map_err(|e| Error::server(format!("Failed to bind {}: {}", addr, e)))?
        .serve(make_service)
        .with_graceful_shutdown(async move { shutdown.cancelled().await });

    info!(port = port, "Starting Prometheus metrics server at /metrics");

    Ok(tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    }))
}

/// Route a request to its response
pub fn handle_request(metrics: &ExporterMetrics, req: Request<Body>) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => match metrics.encode() {
            Ok(text) => text_response(
                StatusCode::OK,
                prometheus::TEXT_FORMAT,
                Body::from(text),
            ),
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain",
                    Body::from(e.to_string()),
                )
            }
        },
        (&Method::GET, "/health") => text_response(StatusCode::OK, "text/plain", Body::from("OK")),
        _ => text_response(StatusCode::NOT_FOUND, "text/plain", Body::from("Not Found")),
    }
}

fn text_response(status: StatusCode, content_type: &str, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Ok(value) = hyper::header::HeaderValue::from_str(content_type) {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}
