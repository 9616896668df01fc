//! BulkConfig - Config Loader output
//!
//! Describes the output routing: which sinks receive every batch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Output routing
    pub sinks: Vec<SinkConfig>,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters (e.g. `dir` for file sinks)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    pub fn new(name: impl Into<String>, sink_type: SinkType) -> Self {
        Self {
            name: name.into(),
            sink_type,
            params: HashMap::new(),
        }
    }

    /// Add a type-specific parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Print to standard output
    Console,
    /// Append to `bulk<timestamp>.log`
    File,
    /// Emit a tracing event
    Log,
}
