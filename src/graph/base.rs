use serde::{
    de::{DeserializeOwned, Error as DeError},
    ser::SerializeStruct,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    config::{AcyclicityPolicy, GraphConfig},
    error::SpanGraphError,
    label::SpanTextLabel,
    properties::{NodeId, Span},
};

use super::{RelationTable, ReverseLookupOrderedSet, SpanIndex};

pub const PROPERTY_SPAN_ANNOTATIONS: &str = "spanAnnotations";
pub const PROPERTY_RELATIONS: &str = "relations";

/// Labeled spans over one document plus an out-degree-one relation between them.
///
/// Nodes are addressable three ways: by [NodeId] (their insertion position), by exact span and
/// label through the span index, and by following the relation table. The graph is read-only
/// once built. Labels must not be mutated through retained external references afterwards;
/// freeze or copy them before building a graph that will be read from several threads.
///
/// Equality and hashing cover the node sequence and relation table only. The span index is a
/// cache derived from the nodes.
#[derive(Debug, Clone)]
pub struct SpanAnnotationGraph<T> {
    nodes: ReverseLookupOrderedSet<T>,
    span_index: SpanIndex,
    relations: RelationTable,
}

impl<T> SpanAnnotationGraph<T>
where
    T: SpanTextLabel + Eq + Hash + Clone,
{
    /// Build from an ordered node sequence and relation table using the default
    /// [GraphConfig]. The sequence must not contain duplicates.
    pub fn new<R: Into<RelationTable>>(nodes: Vec<T>, relations: R) -> Result<Self, SpanGraphError> {
        Self::with_config(nodes, relations, &GraphConfig::default())
    }

    pub fn with_config<R: Into<RelationTable>>(
        nodes: Vec<T>,
        relations: R,
        config: &GraphConfig,
    ) -> Result<Self, SpanGraphError> {
        let nodes = ReverseLookupOrderedSet::try_from_vec(nodes)?;
        Self::from_registry(nodes, relations.into(), config)
    }

    /// The canonical constructor: every other constructor ends here. The span index is always
    /// derived from `nodes`.
    pub fn from_registry(
        nodes: ReverseLookupOrderedSet<T>,
        relations: RelationTable,
        config: &GraphConfig,
    ) -> Result<Self, SpanGraphError> {
        relations.validate(nodes.len())?;
        if config.acyclicity == AcyclicityPolicy::Reject {
            if let Some(node) = relations.find_cycle() {
                tracing::debug!("Rejecting relation table with a cycle through node {}", node);
                return Err(SpanGraphError::RelationCycle { node: node.index() });
            }
        }
        let span_index = SpanIndex::build(&nodes, config.label_collision)?;
        tracing::debug!(
            "Built span annotation graph: {} nodes, {} relations, {} indexed spans",
            nodes.len(),
            relations.edges().count(),
            span_index.span_count()
        );
        Ok(SpanAnnotationGraph {
            nodes,
            span_index,
            relations,
        })
    }

    /// Build from a node sequence together with a span index the caller already holds. The
    /// index is checked against one derived from `nodes` and rejected if they disagree.
    pub fn with_span_index<R: Into<RelationTable>>(
        nodes: Vec<T>,
        span_index: &SpanIndex,
        relations: R,
    ) -> Result<Self, SpanGraphError> {
        let graph = Self::new(nodes, relations)?;
        if &graph.span_index != span_index {
            return Err(SpanGraphError::SpanIndexMismatch);
        }
        Ok(graph)
    }

    pub fn get(&self, id: NodeId) -> Result<&T, SpanGraphError> {
        self.nodes.get(id)
    }

    /// The id of `node`, or `None` if it was never registered.
    pub fn id_of(&self, node: &T) -> Option<NodeId> {
        self.nodes.id_of(node)
    }

    pub fn contains(&self, node: &T) -> bool {
        self.nodes.contains(node)
    }

    /// Nodes whose span is exactly `span`, keyed by label.
    pub fn labels_at(&self, span: &Span) -> Result<BTreeMap<&str, &T>, SpanGraphError> {
        let ids = self.span_index.lookup(span)?;
        ids.iter()
            .map(|(label, id)| Ok((label.as_str(), self.nodes.get(*id)?)))
            .collect()
    }

    /// The node `source` relates to. `Ok(None)` means `source` has no outgoing relation; an
    /// unregistered `source` is an error.
    pub fn relation_target_of(&self, source: &T) -> Result<Option<&T>, SpanGraphError> {
        let source_id = self.require_id(source)?;
        match self.relation_target_id(source_id)? {
            Some(target) => self.get(target).map(Some),
            None => Ok(None),
        }
    }

    pub fn relation_target_id(&self, source: NodeId) -> Result<Option<NodeId>, SpanGraphError> {
        self.relations
            .target(source)
            .ok_or(SpanGraphError::IndexOutOfRange {
                id: source.index(),
                len: self.relations.len(),
            })
    }

    /// Nodes whose relation targets `target`, in id order.
    pub fn relation_sources_of(&self, target: &T) -> Result<Vec<&T>, SpanGraphError> {
        let target_id = self.require_id(target)?;
        self.relations
            .sources_of(target_id)
            .into_iter()
            .map(|id| self.get(id))
            .collect()
    }

    /// Successive relation targets starting from `start` (which is not itself yielded).
    pub fn relation_chain(&self, start: &T) -> Result<RelationChain<'_, T>, SpanGraphError> {
        let start_id = self.require_id(start)?;
        Ok(RelationChain::new(self, start_id))
    }

    /// A node on a relation cycle, if any. Graphs built with [AcyclicityPolicy::Trust] may
    /// contain one.
    pub fn find_cycle(&self) -> Option<NodeId> {
        self.relations.find_cycle()
    }

    pub fn to_petgraph(&self) -> petgraph::Graph<NodeId, ()> {
        self.relations.to_petgraph()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.nodes.entries()
    }

    pub fn nodes(&self) -> &ReverseLookupOrderedSet<T> {
        &self.nodes
    }

    pub fn relations(&self) -> &RelationTable {
        &self.relations
    }

    pub fn span_index(&self) -> &SpanIndex {
        &self.span_index
    }

    pub fn into_parts(self) -> (ReverseLookupOrderedSet<T>, RelationTable) {
        (self.nodes, self.relations)
    }

    fn require_id(&self, node: &T) -> Result<NodeId, SpanGraphError> {
        self.id_of(node).ok_or_else(|| {
            SpanGraphError::NodeNotInGraph(format!(
                "'{}' at {}",
                node.label(),
                node.span()
            ))
        })
    }
}

impl<T> SpanAnnotationGraph<T>
where
    T: SpanTextLabel + Eq + Hash + Clone + Serialize,
{
    pub fn to_json(&self) -> Result<String, SpanGraphError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SpanGraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T> SpanAnnotationGraph<T>
where
    T: SpanTextLabel + Eq + Hash + Clone + DeserializeOwned,
{
    /// Parse interchange JSON with the default [GraphConfig], keeping construction errors typed.
    pub fn from_json(json: &str) -> Result<Self, SpanGraphError> {
        Self::from_json_with_config(json, &GraphConfig::default())
    }

    pub fn from_json_with_config(json: &str, config: &GraphConfig) -> Result<Self, SpanGraphError> {
        let record: GraphRecord<T> = serde_json::from_str(json)?;
        record.into_graph(config)
    }
}

/// Wire shape of a graph. Labels and relations are kept raw so that construction errors surface
/// as [SpanGraphError] values rather than serde messages.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct GraphRecord<T> {
    #[serde(rename = "spanAnnotations")]
    span_annotations: Vec<T>,
    relations: Vec<i64>,
}

impl<T> GraphRecord<T>
where
    T: SpanTextLabel + Eq + Hash + Clone,
{
    fn into_graph(self, config: &GraphConfig) -> Result<SpanAnnotationGraph<T>, SpanGraphError> {
        if self.relations.len() != self.span_annotations.len() {
            return Err(SpanGraphError::RelationTableSizeMismatch {
                nodes: self.span_annotations.len(),
                relations: self.relations.len(),
            });
        }
        let relations = RelationTable::from_raw(&self.relations)?;
        SpanAnnotationGraph::with_config(self.span_annotations, relations, config)
    }
}

impl<T: Serialize> Serialize for SpanAnnotationGraph<T> {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        let mut state = ser.serialize_struct("SpanAnnotationGraph", 2)?;
        state.serialize_field(PROPERTY_SPAN_ANNOTATIONS, &self.nodes)?;
        state.serialize_field(PROPERTY_RELATIONS, &self.relations)?;
        state.end()
    }
}

impl<'de, T> Deserialize<'de> for SpanAnnotationGraph<T>
where
    T: SpanTextLabel + Eq + Hash + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        GraphRecord::<T>::deserialize(de)?
            .into_graph(&GraphConfig::default())
            .map_err(D::Error::custom)
    }
}

impl<T: PartialEq> PartialEq for SpanAnnotationGraph<T> {
    fn eq(&self, other: &Self) -> bool {
        self.relations == other.relations && self.nodes == other.nodes
    }
}

impl<T: Eq> Eq for SpanAnnotationGraph<T> {}

impl<T: Hash> Hash for SpanAnnotationGraph<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relations.hash(state);
        self.nodes.hash(state);
    }
}

impl<T: fmt::Display> fmt::Display for SpanAnnotationGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpanAnnotationGraph [nodes={}, relations={}]",
            self.nodes, self.relations
        )
    }
}

/// Iterator over the relation targets reachable from a node. Each node is yielded at most once,
/// so a cyclic table terminates after the cycle closes.
pub struct RelationChain<'a, T> {
    graph: &'a SpanAnnotationGraph<T>,
    current: NodeId,
    visited: HashSet<NodeId>,
}

impl<'a, T> RelationChain<'a, T> {
    fn new(graph: &'a SpanAnnotationGraph<T>, start: NodeId) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        RelationChain {
            graph,
            current: start,
            visited,
        }
    }
}

impl<'a, T> Iterator for RelationChain<'a, T>
where
    T: SpanTextLabel + Eq + Hash + Clone,
{
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.graph.relations.target(self.current).flatten()?;
        if !self.visited.insert(next) {
            return None;
        }
        self.current = next;
        self.graph.nodes.get(next).ok().map(|node| (next, node))
    }
}
