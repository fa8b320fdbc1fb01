//! W3C `traceparent` continuation for inbound requests.

use opentelemetry::{
    Context,
    propagation::{Extractor, TextMapPropagator as _},
    trace::TraceContextExt as _,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use salvo::http::{HeaderMap, HeaderName};

/// The caller's span context, if the request carries a valid one.
pub(super) fn remote_parent(headers: &HeaderMap) -> Option<Context> {
    // Extract onto an empty context so a request without trace headers never
    // picks up whatever span happens to be active in this task.
    let context =
        TraceContextPropagator::new().extract_with_context(&Context::new(), &Headers(headers));

    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

#[derive(Debug)]
struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::HeaderValue;
    use testresult::TestResult;

    use super::*;

    const TRACEPARENT: &str =
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers(traceparent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_static(traceparent));
        headers
    }

    #[test]
    fn valid_traceparent_becomes_the_parent() -> TestResult {
        let context = remote_parent(&headers(TRACEPARENT)).ok_or("expected a parent context")?;
        let span = context.span();
        let parent = span.span_context();

        assert_eq!(parent.trace_id().to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(parent.span_id().to_string(), "00f067aa0ba902b7");
        assert!(parent.is_sampled(), "sampled flag should carry over");

        Ok(())
    }

    #[test]
    fn missing_or_garbled_traceparent_is_ignored() {
        assert!(remote_parent(&HeaderMap::new()).is_none());
        assert!(remote_parent(&headers("not-a-traceparent")).is_none());
        assert!(
            remote_parent(&headers(
                "00-00000000000000000000000000000000-00f067aa0ba902b7-01"
            ))
            .is_none(),
            "all-zero trace id is invalid"
        );
    }
}
