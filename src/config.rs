use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

use crate::error::SpanGraphError;

/// What to do with a relation table that contains a cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcyclicityPolicy {
    /// Store the table as given; callers are trusted to supply a DAG.
    #[default]
    Trust,
    /// Check for cycles while building and fail with [SpanGraphError::RelationCycle].
    Reject,
}

/// What to do when two distinct nodes share both span and label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCollisionPolicy {
    /// The node inserted later shadows the earlier one in the span index.
    #[default]
    LastWins,
    /// Fail with [SpanGraphError::SpanLabelCollision].
    Reject,
}

/// Build options for [crate::graph::SpanAnnotationGraph]. Defaults store whatever the caller
/// supplies without extra validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub acyclicity: AcyclicityPolicy,
    #[serde(default)]
    pub label_collision: LabelCollisionPolicy,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    graph: GraphConfig,
}

impl GraphConfig {
    pub fn strict() -> Self {
        GraphConfig {
            acyclicity: AcyclicityPolicy::Reject,
            label_collision: LabelCollisionPolicy::Reject,
        }
    }

    /// Parse the `[graph]` table of a TOML document. A document without one yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SpanGraphError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.graph)
    }

    pub fn to_toml_string(&self) -> Result<String, SpanGraphError> {
        Ok(toml::to_string(&ConfigFile { graph: *self })?)
    }

    /// Read configuration from `path`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SpanGraphError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read graph config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using default graph config.");
            return Ok(GraphConfig::default());
        }
        let config = GraphConfig::from_toml_str(&get_content(path)?)?;
        tracing::debug!("Loaded graph config: {:?}", config);
        Ok(config)
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, SpanGraphError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}
