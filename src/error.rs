use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::properties::Span;

/// Which level of the span index a failed lookup stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanMiss {
    /// No node begins at the requested offset.
    Begin,
    /// Nodes begin at the requested offset, but none ends at the requested end.
    End,
}

impl fmt::Display for SpanMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanMiss::Begin => write!(f, "begin"),
            SpanMiss::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum SpanGraphError {
    #[error("Node id {id} is out of range for a registry of {len} nodes")]
    IndexOutOfRange { id: usize, len: usize },
    #[error("Node not found in graph: {0}")]
    NodeNotInGraph(String),
    #[error("No node indexed at span {span} (missing {miss} offset)")]
    SpanNotIndexed { span: Span, miss: SpanMiss },
    #[error("Duplicate value at position {duplicate}, first seen at position {first}")]
    DuplicateValue { first: usize, duplicate: usize },
    #[error("Relation table has {relations} entries but there are {nodes} nodes")]
    RelationTableSizeMismatch { nodes: usize, relations: usize },
    #[error("Relation from node {node} targets {target}, outside of [0, {len})")]
    InvalidRelationTarget { node: usize, target: i64, len: usize },
    #[error("Invalid span: begin {begin} is after end {end}")]
    InvalidSpan { begin: usize, end: usize },
    #[error("Relation table contains a cycle through node {node}")]
    RelationCycle { node: usize },
    #[error("More than one node labeled '{label}' at span {span}")]
    SpanLabelCollision { span: Span, label: String },
    #[error("Supplied span index does not match the node sequence")]
    SpanIndexMismatch,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
}

impl SpanGraphError {
    /// Errors that callers are expected to handle as ordinary control flow rather than defects.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpanGraphError::SpanNotIndexed { .. })
    }
}

impl From<JsonError> for SpanGraphError {
    fn from(src: JsonError) -> SpanGraphError {
        SpanGraphError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for SpanGraphError {
    fn from(src: toml::de::Error) -> SpanGraphError {
        SpanGraphError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for SpanGraphError {
    fn from(src: toml::ser::Error) -> SpanGraphError {
        SpanGraphError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<io::Error> for SpanGraphError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => SpanGraphError::NotFound(format!("{x}")),
            _ => SpanGraphError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
