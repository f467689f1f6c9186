//! # spangraph-core
//!
//! A Rust library for annotating spans of text with labels and directed relations between those
//! labeled spans, as used in discourse and argumentation analysis (e.g. linking a "claim" span to
//! the "evidence" span it depends on).
//!
//! ## Overview
//!
//! A [`graph::SpanAnnotationGraph`] holds every labeled span of one document together with a
//! relation table in which each node points at no more than one other node. Three lookups run in
//! near-constant time:
//!
//! - **By identity**: every node has a stable, zero-based [`properties::NodeId`] equal to its
//!   insertion position, and any node value maps back to its id.
//! - **By coordinates**: a sparse `begin -> end -> label` index answers "which labels sit on
//!   exactly this span?".
//! - **By relation**: the outgoing relation of a node is a single table read.
//!
//! Graphs serialize to and from a stable JSON interchange shape:
//!
//! ```json
//! {
//!   "spanAnnotations": [
//!     {"textSpan": {"begin": 0, "end": 5}, "label": "claim", "attrs": null},
//!     {"textSpan": {"begin": 6, "end": 10}, "label": "evidence", "attrs": null}
//!   ],
//!   "relations": [1, -1]
//! }
//! ```
//!
//! `relations[i]` is the target of node `i`; `-1` means no relation.
//!
//! ## Quick Start
//!
//! ```rust
//! use spangraph_core::{
//!     graph::SpanAnnotationGraph,
//!     label::MutableSpanTextLabel,
//!     properties::{NodeId, Span},
//! };
//!
//! # fn main() -> Result<(), spangraph_core::SpanGraphError> {
//! let claim = MutableSpanTextLabel::new(Span::new(0, 5)?, "claim", None);
//! let evidence = MutableSpanTextLabel::new(Span::new(6, 10)?, "evidence", None);
//!
//! let graph = SpanAnnotationGraph::new(
//!     vec![claim.clone(), evidence.clone()],
//!     vec![Some(NodeId::new(1)), None],
//! )?;
//!
//! assert_eq!(graph.id_of(&evidence), Some(NodeId::new(1)));
//! assert_eq!(graph.relation_target_of(&claim)?, Some(&evidence));
//! assert_eq!(graph.relation_target_of(&evidence)?, None);
//!
//! let json = graph.to_json()?;
//! assert_eq!(SpanAnnotationGraph::<MutableSpanTextLabel>::from_json(&json)?, graph);
//! # Ok(())
//! # }
//! ```
//!
//! ## Acyclicity
//!
//! Relation tables are meant to form a DAG, but by default the graph stores whatever table it
//! is given. Set [`config::AcyclicityPolicy::Reject`] in a [`config::GraphConfig`] to check at
//! build time, or call [`graph::SpanAnnotationGraph::find_cycle`] on demand.
//!
//! ## Concurrency
//!
//! Graphs are plain owned data with no interior mutability and can be shared across threads for
//! reading. Labels passed in must not be mutated through other references afterwards.
//!
//! ## Features
//!
//! - **default**: the library
//! - **bin**: the `spangraph` CLI for inspecting interchange files
//!
//! ## Module Guide
//!
//! - **[`graph`]**: the composed graph and its registry, span index and relation table
//! - **[`label`]**: the [`label::SpanTextLabel`] contract and its mutable/immutable variants
//! - **[`properties`]**: spans, node ids and attribute values
//! - **[`annotation`]**: conversion from host-framework annotations
//! - **[`config`]**: build-time validation policies

pub mod annotation;
pub mod config;
pub mod error;
pub mod graph;
pub mod label;
pub mod properties;
#[cfg(test)]
mod tests;

pub use error::*;
