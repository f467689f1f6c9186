//! Sparse two-level index from span coordinates to the labels found there.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use crate::{
    config::LabelCollisionPolicy,
    error::{SpanGraphError, SpanMiss},
    label::SpanTextLabel,
    properties::{NodeId, Span},
};

use super::ReverseLookupOrderedSet;

/// Labels present at one exact span, keyed by label name.
pub type LabelIds = BTreeMap<String, NodeId>;

/// `begin -> end -> label -> node` over a finalized node sequence.
///
/// The index is derived data: it is rebuilt from the registry and never edited in place. Several
/// labels may share one span (e.g. "claim" and "stance" on the same text); two nodes with the same
/// span *and* label are resolved according to [LabelCollisionPolicy].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanIndex {
    by_begin: HashMap<usize, HashMap<usize, LabelIds>>,
}

impl SpanIndex {
    pub fn build<T>(
        nodes: &ReverseLookupOrderedSet<T>,
        collisions: LabelCollisionPolicy,
    ) -> Result<Self, SpanGraphError>
    where
        T: SpanTextLabel + Eq + Hash + Clone,
    {
        let mut by_begin: HashMap<usize, HashMap<usize, LabelIds>> = HashMap::new();
        for (id, node) in nodes.entries() {
            let span = node.span();
            let labels = by_begin
                .entry(span.begin())
                .or_default()
                .entry(span.end())
                .or_default();
            if let Some(previous) = labels.insert(node.label().to_string(), id) {
                match collisions {
                    LabelCollisionPolicy::LastWins => {
                        tracing::warn!(
                            "Node {} shadows node {} for label '{}' at span {}",
                            id,
                            previous,
                            node.label(),
                            span
                        );
                    }
                    LabelCollisionPolicy::Reject => {
                        return Err(SpanGraphError::SpanLabelCollision {
                            span,
                            label: node.label().to_string(),
                        });
                    }
                }
            }
        }
        Ok(SpanIndex { by_begin })
    }

    /// Labels at exactly `span`. The error's [SpanMiss] tells whether no node begins at
    /// `span.begin()` or whether none of those ends at `span.end()`.
    pub fn lookup(&self, span: &Span) -> Result<&LabelIds, SpanGraphError> {
        let ends = self
            .by_begin
            .get(&span.begin())
            .ok_or(SpanGraphError::SpanNotIndexed {
                span: *span,
                miss: SpanMiss::Begin,
            })?;
        ends.get(&span.end()).ok_or(SpanGraphError::SpanNotIndexed {
            span: *span,
            miss: SpanMiss::End,
        })
    }

    pub fn contains(&self, span: &Span) -> bool {
        self.lookup(span).is_ok()
    }

    /// All indexed spans that begin at `begin`, with their labels, ordered by end offset.
    pub fn starting_at(&self, begin: usize) -> Vec<(Span, &LabelIds)> {
        let mut spans: Vec<(Span, &LabelIds)> = self
            .by_begin
            .get(&begin)
            .into_iter()
            .flat_map(|ends| ends.iter())
            .filter_map(|(end, labels)| Span::new(begin, *end).ok().map(|span| (span, labels)))
            .collect();
        spans.sort_by_key(|(span, _)| *span);
        spans
    }

    /// Every indexed span in `(begin, end)` order.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .by_begin
            .iter()
            .flat_map(|(begin, ends)| {
                ends.keys()
                    .filter_map(move |end| Span::new(*begin, *end).ok())
            })
            .collect();
        spans.sort();
        spans
    }

    /// Number of distinct spans indexed.
    pub fn span_count(&self) -> usize {
        self.by_begin.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_begin.is_empty()
    }
}
