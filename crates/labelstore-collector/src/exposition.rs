//! Prometheus text exposition (format 0.0.4) of registered metrics.
//!
//! Values come from `all_values()`, so each metric's top-K projection is
//! applied here.

use std::fmt::Write;

use labelstore_core::LabelSet;

use crate::metric::Metric;
use crate::registry::MetricRegistry;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        format!("{v}")
    }
}

fn format_labels(labels: &LabelSet) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let inner = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(&v.to_string())))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inner}}}")
}

fn render_metric(metric: &Metric, out: &mut String) {
    let name = metric.name();
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(metric.desc()));
    let _ = writeln!(out, "# TYPE {} {}", name, metric.kind().as_str());
    for (labels, value) in metric.values() {
        let _ = writeln!(out, "{}{} {}", name, format_labels(&labels), format_value(value));
    }
}

/// Render every registered metric, sorted by name.
pub fn render(registry: &MetricRegistry) -> String {
    let mut out = String::new();
    for metric in registry.metrics() {
        render_metric(&metric, &mut out);
    }
    out
}
