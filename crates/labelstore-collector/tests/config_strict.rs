#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use labelstore_collector::{app_state::AppState, config, metric::MetricKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  - name: simple
    type: counter
    topkk: 2 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
metrics:
  - name: simple
    type: counter
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.collector.listen, "0.0.0.0:24231");
    let m = &cfg.metrics[0];
    assert_eq!(m.name, "simple");
    assert_eq!(m.kind, MetricKind::Counter);
    assert_eq!(m.topk, None);

    let timers = m.timers();
    assert_eq!(timers.retention, None);
    assert_eq!(timers.retention_check_interval, Duration::from_secs(60));
    assert_eq!(timers.reset_after, None);
}

#[test]
fn full_metric_config() {
    let ok = r#"
version: 1
collector:
  listen: "127.0.0.1:9100"
metrics:
  - name: requests_total
    type: counter
    desc: Requests seen.
    topk: 2
    retention: 30
    retention_check_interval: 5
    reset_after: 300
  - name: queue_depth
    type: gauge
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let timers = cfg.metrics[0].timers();
    assert_eq!(timers.retention, Some(Duration::from_secs(30)));
    assert_eq!(timers.retention_check_interval, Duration::from_secs(5));
    assert_eq!(timers.reset_after, Some(Duration::from_secs(300)));
    assert_eq!(cfg.metrics[1].kind, MetricKind::Gauge);

    let state = AppState::new(cfg).expect("must register");
    let m = state.registry().get("requests_total").expect("registered");
    assert_eq!(m.store().topk(), 2);
    assert_eq!(m.desc(), "Requests seen.");
}

#[test]
fn version_and_empty_metrics_rejected() {
    let err = config::load_from_str("version: 2\nmetrics: [{name: a, type: gauge}]\n")
        .expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");

    let err = config::load_from_str("version: 1\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn bad_names_and_timers_rejected() {
    for bad in [
        "version: 1\nmetrics: [{name: '1abc', type: counter}]\n",
        "version: 1\nmetrics: [{name: 'a-b', type: counter}]\n",
        "version: 1\nmetrics: [{name: a, type: histogram}]\n",
        "version: 1\nmetrics: [{name: a, type: counter, retention: 0}]\n",
        "version: 1\nmetrics: [{name: a, type: counter, retention_check_interval: 0}]\n",
        "version: 1\nmetrics: [{name: a, type: counter, reset_after: 0}]\n",
        "version: 1\ncollector: {listen: 'nowhere'}\nmetrics: [{name: a, type: counter}]\n",
    ] {
        let err = config::load_from_str(bad).expect_err("must fail");
        assert_eq!(err.code().as_str(), "BAD_REQUEST", "config={bad}");
    }
}

#[test]
fn duplicate_metric_rejected() {
    let bad = "version: 1\nmetrics: [{name: a, type: counter}, {name: a, type: gauge}]\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "DUPLICATE_METRIC");
}

#[test]
fn invalid_topk_fails_at_registration() {
    for topk in ["-1", "1.5", "'2'"] {
        let src = format!("version: 1\nmetrics: [{{name: a, type: counter, topk: {topk}}}]\n");
        // parses: topk is carried untyped
        let cfg = config::load_from_str(&src).expect("must parse");
        let err = AppState::new(cfg).err().expect("must fail");
        assert_eq!(err.code().as_str(), "INVALID_STORE_SETTINGS", "topk={topk}");
    }
}

#[test]
fn unset_topk_defaults_to_zero() {
    for src in [
        "version: 1\nmetrics: [{name: a, type: counter}]\n",
        "version: 1\nmetrics: [{name: a, type: counter, topk: ~}]\n",
    ] {
        let cfg = config::load_from_str(src).expect("must parse");
        let state = AppState::new(cfg).expect("must register");
        assert_eq!(state.registry().get("a").unwrap().store().topk(), 0, "config={src}");
    }
}
