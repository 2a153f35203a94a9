use thiserror::Error;

/// Errors raised when a node data update violates the node's declared schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeDataError {
    #[error("Node '{node_id}' has no parameter named '{parameter}' in its schema")]
    UnknownParameter { node_id: String, parameter: String },

    #[error(
        "Parameter '{parameter}' of node '{node_id}' expects a {expected} value, but received '{found}'"
    )]
    TypeMismatch {
        node_id: String,
        parameter: String,
        expected: String,
        found: serde_json::Value,
    },

    #[error("Parameter '{parameter}' of node '{node_id}' cannot be linked to an incoming edge")]
    NotConnectable { node_id: String, parameter: String },

    #[error("Node '{node_id}' data is malformed after update: {message}")]
    Malformed { node_id: String, message: String },
}

/// Errors raised by the tab manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabOrderError {
    #[error("Reordered tab list is missing open tab '{0}'")]
    MissingTab(String),

    #[error("Reordered tab list contains '{0}', which is not an open tab")]
    UnknownTab(String),

    #[error("Reordered tab list contains '{0}' more than once")]
    DuplicateTab(String),
}

/// Errors raised at the remote sync boundary.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to decode sync message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Sync queue is full (capacity {capacity}); message for '{path}' was not queued")]
    QueueFull { path: String, capacity: usize },

    #[error("Sync channel is closed")]
    Disconnected,
}

/// Errors reported by a persistence collaborator.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Workflow '{path}' was not found in workspace '{workspace_id}'")]
    NotFound { workspace_id: String, path: String },

    #[error("Workflow path '{0}' escapes its workspace directory")]
    InvalidPath(String),

    #[error("I/O error while accessing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize workflow '{path}': {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Persistence backend error: {0}")]
    Backend(String),
}

/// Errors raised while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}
