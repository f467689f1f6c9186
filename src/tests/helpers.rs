//! Shared test utilities for graph testing

use crate::{
    graph::SpanAnnotationGraph,
    label::{ImmutableSpanTextLabel, MutableSpanTextLabel},
    properties::{NodeId, Span},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn span(begin: usize, end: usize) -> Span {
    Span::new(begin, end).expect("test spans are well formed")
}

/// Helper function to create an unattributed label
pub fn create_test_label(begin: usize, end: usize, label: &str) -> MutableSpanTextLabel {
    MutableSpanTextLabel::new(span(begin, end), label, None)
}

/// Relation table from interchange-style integers (negative means no relation)
pub fn relations(raw: &[i64]) -> Vec<Option<NodeId>> {
    raw.iter()
        .map(|&target| (target >= 0).then(|| NodeId::new(target as usize)))
        .collect()
}

/// The two-node argument used throughout the tests:
///
/// "Taxes should rise. Data shows deficits." with a claim at [0, 5) supported by evidence at
/// [6, 10).
pub fn create_claim_evidence_graph() -> SpanAnnotationGraph<MutableSpanTextLabel> {
    init_logging();
    let claim = create_test_label(0, 5, "claim");
    let evidence = create_test_label(6, 10, "evidence");
    SpanAnnotationGraph::new(vec![claim, evidence], relations(&[1, -1])).unwrap()
}

/// A small argument with a premise chain, a shared span carrying two label dimensions, and an
/// unrelated node:
///
/// ```text
/// 0: premise  [20, 30) -> 1
/// 1: premise  [12, 19) -> 2
/// 2: claim    [0, 11)  -> none
/// 3: stance   [0, 11)  -> none
/// 4: evidence [31, 40) -> 2
/// ```
pub fn create_argument_graph() -> SpanAnnotationGraph<ImmutableSpanTextLabel> {
    init_logging();
    let nodes = vec![
        create_test_label(20, 30, "premise").freeze(),
        create_test_label(12, 19, "premise").freeze(),
        create_test_label(0, 11, "claim").freeze(),
        create_test_label(0, 11, "stance").freeze(),
        create_test_label(31, 40, "evidence").freeze(),
    ];
    SpanAnnotationGraph::new(nodes, relations(&[1, 2, -1, -1, 2])).unwrap()
}
