//! The relation table: a dense, out-degree-one edge list indexed by source node id.

use petgraph::{algo::kosaraju_scc, graph::NodeIndex, Graph};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{error::SpanGraphError, properties::NodeId};

/// Interchange value of a relation entry with no target. Any negative entry reads as "none".
pub const NO_RELATION: i64 = -1;

/// `table[source] = Some(target)` or `None` for a node with no outgoing relation.
///
/// The table is meant to describe a DAG, but nothing here enforces it; see [Self::find_cycle].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelationTable(Vec<Option<NodeId>>);

impl RelationTable {
    pub fn new(entries: Vec<Option<NodeId>>) -> Self {
        RelationTable(entries)
    }

    /// A table of `len` entries, none of which has a target.
    pub fn unrelated(len: usize) -> Self {
        RelationTable(vec![None; len])
    }

    /// Decode interchange integers. Negative entries become `None`; bounds are checked later by
    /// [Self::validate] once the node count is known.
    pub fn from_raw(raw: &[i64]) -> Result<Self, SpanGraphError> {
        raw.iter()
            .enumerate()
            .map(|(source, &target)| {
                if target < 0 {
                    return Ok(None);
                }
                usize::try_from(target)
                    .map(|index| Some(NodeId::new(index)))
                    .map_err(|_| SpanGraphError::InvalidRelationTarget {
                        node: source,
                        target,
                        len: raw.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RelationTable)
    }

    pub fn to_raw(&self) -> Vec<i64> {
        self.0
            .iter()
            .map(|entry| match entry {
                Some(target) => target.index() as i64,
                None => NO_RELATION,
            })
            .collect()
    }

    /// Check the table against a registry of `node_count` nodes: one entry per node, and every
    /// target a valid id.
    pub fn validate(&self, node_count: usize) -> Result<(), SpanGraphError> {
        if self.0.len() != node_count {
            return Err(SpanGraphError::RelationTableSizeMismatch {
                nodes: node_count,
                relations: self.0.len(),
            });
        }
        for (source, entry) in self.0.iter().enumerate() {
            if let Some(target) = entry {
                if target.index() >= node_count {
                    return Err(SpanGraphError::InvalidRelationTarget {
                        node: source,
                        target: target.index() as i64,
                        len: node_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// The entry for `source`, or `None` when `source` is outside the table.
    pub fn target(&self, source: NodeId) -> Option<Option<NodeId>> {
        self.0.get(source.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<NodeId>] {
        &self.0
    }

    /// `(source, target)` pairs for every node that has a relation.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(source, entry)| entry.map(|target| (NodeId::new(source), target)))
    }

    /// Nodes whose relation points at `target`, in id order.
    pub fn sources_of(&self, target: NodeId) -> Vec<NodeId> {
        self.edges()
            .filter(|(_, sink)| *sink == target)
            .map(|(source, _)| source)
            .collect()
    }

    /// Export as a petgraph graph whose node indices equal the table's node ids.
    pub fn to_petgraph(&self) -> Graph<NodeId, ()> {
        let mut graph = Graph::with_capacity(self.0.len(), self.0.len());
        for index in 0..self.0.len() {
            graph.add_node(NodeId::new(index));
        }
        for (source, target) in self.edges() {
            if target.index() < self.0.len() {
                graph.add_edge(
                    NodeIndex::new(source.index()),
                    NodeIndex::new(target.index()),
                    (),
                );
            }
        }
        graph
    }

    /// A node lying on a cycle, if the table has one.
    pub fn find_cycle(&self) -> Option<NodeId> {
        if let Some((source, _)) = self.edges().find(|(source, target)| source == target) {
            return Some(source);
        }
        // Self-loops form singleton components, so they are handled above.
        let graph = self.to_petgraph();
        kosaraju_scc(&graph)
            .iter()
            .filter(|scc| scc.len() > 1)
            .filter_map(|scc| scc.iter().map(|index| graph[*index]).min())
            .min()
    }
}

impl From<Vec<Option<NodeId>>> for RelationTable {
    fn from(entries: Vec<Option<NodeId>>) -> Self {
        RelationTable(entries)
    }
}

impl fmt::Display for RelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_raw())
    }
}

impl Serialize for RelationTable {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(ser)
    }
}

impl<'de> Deserialize<'de> for RelationTable {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = Vec::<i64>::deserialize(de)?;
        RelationTable::from_raw(&raw).map_err(serde::de::Error::custom)
    }
}
