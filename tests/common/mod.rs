//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use spangraph_core::{
    graph::SpanAnnotationGraph,
    label::ImmutableSpanTextLabel,
    properties::{Attributes, AttrValue, NodeId, Span},
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// The document every integration test annotates.
#[allow(dead_code)]
pub const DOCUMENT: &str = "Taxes should rise. Deficits grew by 4% last year, so revenue must follow.";

/// Label `[begin, end)` of [DOCUMENT], carrying its covered text.
#[allow(dead_code)]
pub fn doc_label(begin: usize, end: usize, label: &str) -> ImmutableSpanTextLabel {
    ImmutableSpanTextLabel::new(Span::new(begin, end).unwrap(), label, None)
        .with_covered_text(&DOCUMENT[begin..end])
}

/// Build the reference argument over [DOCUMENT]:
///
/// ```text
/// 0: claim    "Taxes should rise."          -> none
/// 1: stance   "Taxes should rise."          -> none
/// 2: evidence "Deficits grew by 4% last year" -> 3
/// 3: premise  "revenue must follow."        -> 0
/// ```
#[allow(dead_code)]
pub fn create_reference_graph() -> SpanAnnotationGraph<ImmutableSpanTextLabel> {
    init_logging();
    let mut confidence = Attributes::new();
    confidence.insert("confidence".to_string(), AttrValue::Float(0.8));
    confidence.insert("annotator".to_string(), AttrValue::from("a1"));

    let nodes = vec![
        doc_label(0, 18, "claim"),
        ImmutableSpanTextLabel::new(Span::new(0, 18).unwrap(), "stance", Some(confidence))
            .with_covered_text(&DOCUMENT[0..18]),
        doc_label(19, 48, "evidence"),
        doc_label(53, 73, "premise"),
    ];
    let relations = vec![None, None, Some(NodeId::new(3)), Some(NodeId::new(0))];
    SpanAnnotationGraph::new(nodes, relations).unwrap()
}

/// Write `content` into `<temp_dir>/<name>` and return the path.
#[allow(dead_code)]
pub fn write_fixture(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}
