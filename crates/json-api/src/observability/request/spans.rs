//! HTTP span naming.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestSpanName {
    /// Path with identifiers replaced by placeholders, safe as a metric label.
    pub(super) route: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let route = route_template(path);
    let otel_span_name = format!("{method} {route}");

    RequestSpanName {
        route,
        otel_span_name,
    }
}

/// `/orders/<uuid>/status` becomes `/orders/{order}/status`.
fn route_template(path: &str) -> String {
    let mut previous = "";
    let mut segments = Vec::new();

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        if Uuid::parse_str(segment).is_ok() {
            segments.push(placeholder_for(previous));
        } else {
            segments.push(segment.to_owned());
        }

        previous = segment;
    }

    format!("/{}", segments.join("/"))
}

fn placeholder_for(collection: &str) -> String {
    match collection.strip_suffix('s') {
        Some(singular) if !singular.is_empty() => format!("{{{singular}}}"),
        _ => "{uuid}".to_owned(),
    }
}
