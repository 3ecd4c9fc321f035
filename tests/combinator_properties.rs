// tests/combinator_properties.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use pageflow::graph::{execute, leaf, parallel, series, GraphNode};
use pageflow_test_utils::fake_steps::{failing_step, logged, recording_step, run_log, RunLog};

/// Shape of a generated graph; `Leaf(true)` fails.
#[derive(Debug, Clone)]
enum Shape {
    Leaf(bool),
    Series(Vec<Shape>),
    Parallel(Vec<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop::bool::weighted(0.25)
        .prop_map(Shape::Leaf)
        .prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Shape::Series),
                prop::collection::vec(inner, 1..4).prop_map(Shape::Parallel),
            ]
        })
}

/// Build the graph and, alongside it, the expected behaviour:
/// which leaves run and which leaf the outcome blames.
fn build(shape: &Shape, next_id: &mut usize, log: &RunLog) -> (Arc<GraphNode>, BTreeSet<String>, Option<String>) {
    match shape {
        Shape::Leaf(fails) => {
            let name = format!("leaf_{next_id}");
            *next_id += 1;
            let step = if *fails {
                failing_step(&name, "generated failure", log)
            } else {
                recording_step(&name, log)
            };
            let failure = fails.then(|| name.clone());
            (leaf(step), BTreeSet::from([name]), failure)
        }
        Shape::Series(children) => {
            let mut nodes = Vec::new();
            let mut ran = BTreeSet::new();
            let mut failure = None;
            for child in children {
                // Children after a failure are still built (ids stay stable)
                // but must never run.
                let (node, child_ran, child_failure) = build(child, next_id, log);
                nodes.push(node);
                if failure.is_none() {
                    ran.extend(child_ran);
                    failure = child_failure;
                }
            }
            (series(nodes), ran, failure)
        }
        Shape::Parallel(children) => {
            let mut nodes = Vec::new();
            let mut ran = BTreeSet::new();
            let mut failure = None;
            for child in children {
                let (node, child_ran, child_failure) = build(child, next_id, log);
                nodes.push(node);
                ran.extend(child_ran);
                if failure.is_none() {
                    failure = child_failure;
                }
            }
            (parallel(nodes), ran, failure)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn executor_matches_combinator_semantics(shape in shape_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let log = run_log();
        let mut next_id = 0;
        let (node, expected_ran, expected_failure) = build(&shape, &mut next_id, &log);

        let outcome = rt.block_on(execute(node));

        let ran: BTreeSet<String> = logged(&log).into_iter().collect();
        prop_assert_eq!(ran, expected_ran);
        prop_assert_eq!(outcome.err().map(|f| f.step), expected_failure);
    }

    #[test]
    fn executing_twice_gives_the_same_outcome(shape in shape_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let log = run_log();
        let mut next_id = 0;
        let (node, _, _) = build(&shape, &mut next_id, &log);

        let first = rt.block_on(execute(node.clone())).map(|r| r.written).map_err(|f| f.step);
        let second = rt.block_on(execute(node)).map(|r| r.written).map_err(|f| f.step);

        prop_assert_eq!(first, second);
    }
}
