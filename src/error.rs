//! Error types for the Keel document engine

use thiserror::Error;

use crate::document::plugin::replacement::ReplacementError;

/// Main error type for Keel operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// YAML decode/encode error
    #[error("yaml error: {source}")]
    Yaml {
        /// The underlying serde_yaml error
        #[from]
        source: serde_yaml::Error,
    },

    /// Stream I/O error
    #[error("i/o error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Replacement engine error
    #[error(transparent)]
    Replacement(#[from] ReplacementError),

    /// A plugin configuration document named a kind no factory is registered for
    #[error("no plugin registered for {api_version}/{kind}")]
    UnknownPlugin {
        /// apiVersion of the configuration document
        api_version: String,
        /// kind of the configuration document
        kind: String,
    },

    /// A plugin configuration document is missing a required identity field
    #[error("plugin configuration has no '{field}' field")]
    MalformedPluginConfig {
        /// The missing field name
        field: String,
    },
}

impl Error {
    /// Create an unknown-plugin error for the given configuration identity
    pub fn unknown_plugin(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownPlugin {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// Create a malformed-plugin-config error for the given field
    pub fn malformed_plugin_config(field: impl Into<String>) -> Self {
        Self::MalformedPluginConfig {
            field: field.into(),
        }
    }
}
