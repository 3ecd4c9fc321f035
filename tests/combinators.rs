// tests/combinators.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::time::Duration;

use pageflow::artifact::RunReport;
use pageflow::graph::{execute, leaf, parallel, series, Step};
use pageflow_test_utils::fake_steps::{
    counting_step, failing_step, logged, recording_step, run_log, slow_step,
};

#[tokio::test]
async fn series_runs_children_in_declaration_order() {
    init_tracing();
    let log = run_log();

    let node = series([
        leaf(slow_step("a", Duration::from_millis(30), &log)),
        leaf(recording_step("b", &log)),
        leaf(recording_step("c", &log)),
    ]);

    let report = with_timeout(execute(node)).await.expect("series should succeed");

    assert_eq!(logged(&log), vec!["a", "b", "c"]);
    assert_eq!(
        report.written,
        vec![PathBuf::from("out/b"), PathBuf::from("out/c")]
    );
}

#[tokio::test]
async fn series_stops_at_first_failure() {
    init_tracing();
    let log = run_log();

    let node = series([
        leaf(recording_step("a", &log)),
        leaf(failing_step("b", "boom", &log)),
        leaf(recording_step("c", &log)),
    ]);

    let failure = with_timeout(execute(node)).await.expect_err("series should fail");

    assert_eq!(failure.step, "b");
    assert!(format!("{:#}", failure.cause).contains("boom"));
    assert_eq!(logged(&log), vec!["a", "b"], "c must never start");
}

#[tokio::test]
async fn parallel_runs_every_child_even_when_one_fails() {
    init_tracing();
    let log = run_log();

    let node = parallel([
        leaf(failing_step("a", "first", &log)),
        leaf(slow_step("b", Duration::from_millis(50), &log)),
        leaf(recording_step("c", &log)),
    ]);

    let failure = with_timeout(execute(node)).await.expect_err("parallel should fail");

    assert_eq!(failure.step, "a");
    let mut ran = logged(&log);
    ran.sort();
    assert_eq!(ran, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn parallel_reports_lowest_index_failure() {
    init_tracing();
    let log = run_log();

    // The later child fails first in time; the earlier one still wins.
    let node = parallel([
        series([
            leaf(slow_step("wait", Duration::from_millis(50), &log)),
            leaf(failing_step("slow-fail", "slow", &log)),
        ]),
        leaf(failing_step("fast-fail", "fast", &log)),
    ]);

    let failure = with_timeout(execute(node)).await.expect_err("parallel should fail");

    assert_eq!(failure.step, "slow-fail");
}

#[tokio::test]
async fn parallel_merges_reports_in_child_order() {
    init_tracing();
    let log = run_log();

    let node = parallel([
        leaf(slow_step("slow", Duration::from_millis(30), &log)),
        leaf(recording_step("x", &log)),
        series([leaf(recording_step("y", &log)), leaf(recording_step("z", &log))]),
    ]);

    let report = with_timeout(execute(node)).await.expect("parallel should succeed");

    assert_eq!(
        report.written,
        vec![
            PathBuf::from("out/x"),
            PathBuf::from("out/y"),
            PathBuf::from("out/z")
        ]
    );
}

#[tokio::test]
async fn graph_can_be_executed_repeatedly() {
    init_tracing();
    let (step, count) = counting_step("count");
    let node = series([leaf(step)]);

    for _ in 0..3 {
        with_timeout(execute(node.clone())).await.expect("run should succeed");
    }

    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn panicking_step_becomes_a_failure() {
    init_tracing();
    let step = Step::new("panics", || -> anyhow::Result<RunReport> { panic!("step exploded") });

    let failure = with_timeout(execute(leaf(step)))
        .await
        .expect_err("panic should surface as failure");

    assert_eq!(failure.step, "panics");
}

#[test]
fn labels_describe_the_composition() {
    let log = run_log();
    let node = series([
        leaf(recording_step("clean", &log)),
        parallel([
            leaf(recording_step("styles", &log)),
            leaf(recording_step("scripts", &log)),
        ]),
    ]);

    assert_eq!(node.label(), "series[clean, parallel[styles, scripts]]");
    assert_eq!(node.step_names(), vec!["clean", "styles", "scripts"]);
}
