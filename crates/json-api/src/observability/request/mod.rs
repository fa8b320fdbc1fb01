//! Per-request span, access log and HTTP metrics.

mod request_ids;
mod spans;
mod trace_context;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Paths served without a span or access log line.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[derive(Debug)]
struct AccessLog {
    request_id: String,
    method: String,
    path: String,
    route: String,
    started: Instant,
}

impl AccessLog {
    fn span(&self, remote_addr: &str, otel_span_name: &str) -> Span {
        tracing::info_span!(
            parent: None,
            "http.request",
            otel.name = %otel_span_name,
            otel.kind = "server",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            route = %self.route,
            remote_addr = %remote_addr,
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty
        )
    }

    fn finish(self, span: &Span, status: StatusCode) {
        let duration = self.started.elapsed();
        let duration_ms = duration.as_millis();

        metrics::observe_request(
            &self.method,
            &self.route,
            status.as_u16(),
            duration.as_secs_f64(),
        );

        span.record("status", status.as_u16());
        span.record("duration_ms", duration_ms);

        span.in_scope(|| {
            info!(status = status.as_u16(), duration_ms, "request.completed");

            if status.is_server_error() {
                error!(status = status.as_u16(), route = %self.route, "server error response");
            } else if status.is_client_error() {
                warn!(status = status.as_u16(), route = %self.route, "client error response");
            }

            let threshold = Duration::from_millis(settings::slow_request_threshold_ms());

            if duration > threshold {
                warn!(
                    route = %self.route,
                    duration_ms,
                    threshold_ms = threshold.as_millis(),
                    "slow request detected"
                );
            }
        });
    }
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let names = spans::request_span_name(&method, &path);

    let log = AccessLog {
        request_id,
        method,
        path,
        route: names.route,
        started: Instant::now(),
    };

    let span = log.span(&req.remote_addr().to_string(), &names.otel_span_name);

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = trace_context::remote_parent(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    let _in_flight_request = metrics::InFlightRequestGuard::track();

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    log.finish(&span, request_ids::response_status_or_ok(res.status_code));
}
