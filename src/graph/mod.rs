//! Graph module: the span annotation graph and the structures it is composed of.
//!
//! # Module Organization
//!
//! - [`ordered_set`]: identity registry ([ReverseLookupOrderedSet])
//! - [`span_index`]: span-coordinate index ([SpanIndex])
//! - [`relations`]: out-degree-one relation table ([RelationTable])
//! - [`base`]: the composed [SpanAnnotationGraph]
//!
//! ```rust
//! use spangraph_core::{
//!     graph::SpanAnnotationGraph,
//!     label::{ImmutableSpanTextLabel, SpanTextLabel},
//!     properties::{NodeId, Span},
//! };
//!
//! let claim = ImmutableSpanTextLabel::new(Span::new(0, 5)?, "claim", None);
//! let evidence = ImmutableSpanTextLabel::new(Span::new(6, 10)?, "evidence", None);
//! let graph = SpanAnnotationGraph::new(
//!     vec![claim.clone(), evidence.clone()],
//!     vec![Some(NodeId::new(1)), None],
//! )?;
//!
//! assert_eq!(graph.relation_target_of(&claim)?, Some(&evidence));
//! assert_eq!(graph.labels_at(&Span::new(0, 5)?)?["claim"].label(), "claim");
//! # Ok::<(), spangraph_core::SpanGraphError>(())
//! ```

mod base;
mod ordered_set;
mod relations;
mod span_index;

#[cfg(test)]
mod tests;

pub use base::{
    RelationChain, SpanAnnotationGraph, PROPERTY_RELATIONS, PROPERTY_SPAN_ANNOTATIONS,
};
pub use ordered_set::ReverseLookupOrderedSet;
pub use relations::{RelationTable, NO_RELATION};
pub use span_index::{LabelIds, SpanIndex};
