/// [crate::properties] contains the value types shared by labels and graphs: text [Span]s, graph
/// [NodeId]s and the loosely-typed attribute payloads ([AttrValue]) carried by labels.
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

use crate::error::SpanGraphError;

/// A half-open interval `[begin, end)` of character offsets into a document.
///
/// Spans order by `begin`, then by `end`. The `begin <= end` invariant is checked on
/// construction and on deserialization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    begin: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawSpan {
    begin: usize,
    end: usize,
}

impl TryFrom<RawSpan> for Span {
    type Error = SpanGraphError;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        Span::new(raw.begin, raw.end)
    }
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Result<Self, SpanGraphError> {
        if begin > end {
            return Err(SpanGraphError::InvalidSpan { begin, end });
        }
        Ok(Span { begin, end })
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// Position of a node within a graph's insertion order. Ids are dense, zero-based and never
/// reassigned for the lifetime of the graph that issued them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute map attached to a label. Ordered so that equality and hashing are independent of
/// insertion order.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A JSON-shaped attribute value.
///
/// Integers above `i64::MAX` are held as [AttrValue::UInt] so they survive a round trip. Floats
/// compare and hash by bit pattern so that [AttrValue] can be `Eq + Hash` and take part
/// in label identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
    Map(Attributes),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttrValue::UInt(u) => Some(*u),
            AttrValue::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(x) => Some(*x),
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Null, AttrValue::Null) => true,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::UInt(a), AttrValue::UInt(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::List(a), AttrValue::List(b)) => a == b,
            (AttrValue::Map(a), AttrValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl Hash for AttrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttrValue::Null => {}
            AttrValue::Bool(b) => b.hash(state),
            AttrValue::Int(i) => i.hash(state),
            AttrValue::UInt(u) => u.hash(state),
            AttrValue::Float(x) => x.to_bits().hash(state),
            AttrValue::Str(s) => s.hash(state),
            AttrValue::List(items) => items.hash(state),
            AttrValue::Map(map) => map.hash(state),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => AttrValue::Int(i),
            Err(_) => AttrValue::UInt(value),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<Attributes> for AttrValue {
    fn from(value: Attributes) -> Self {
        AttrValue::Map(value)
    }
}
