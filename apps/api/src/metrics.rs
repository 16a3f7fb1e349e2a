//! Prometheus text exposition for /metrics. The only metric is a static
//! process liveness gauge; request-level metrics live in the tracing layer.

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub fn render_metrics() -> String {
    let mut output = String::new();
    output.push_str("# HELP site_api_up Static process liveness gauge for site-api\n");
    output.push_str("# TYPE site_api_up gauge\n");
    output.push_str("site_api_up 1\n");
    output
}
