//! Error taxonomy for the replacement engine
//!
//! Every failure the engine can produce is one of these kinds. Errors abort
//! the current transform immediately and propagate to the caller unchanged;
//! there is no internal retry and no rollback of mutations already applied.

use thiserror::Error;

/// Replacement engine error
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReplacementError {
    /// The rule set is malformed (missing source/target, ambiguous source)
    #[error("bad configuration: {message}")]
    BadConfiguration {
        /// Description of what is malformed
        message: String,
    },

    /// The source object selector matched no documents
    #[error("source document not found: no document matches [{selector}]")]
    SourceNotFound {
        /// The selector that matched nothing
        selector: String,
    },

    /// The source object selector matched more than one document
    #[error("ambiguous source: {count} documents match [{selector}], expected exactly one")]
    MultipleResources {
        /// The ambiguous selector
        selector: String,
        /// How many documents matched
        count: usize,
    },

    /// The target object selector matched no documents
    #[error("target document not found: no document matches [{selector}]")]
    TargetNotFound {
        /// The selector that matched nothing
        selector: String,
    },

    /// Traversal found a node of the wrong shape for the current path step
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// Description of the shape conflict
        message: String,
    },

    /// A numeric sequence index is outside `[0, len)`
    #[error("index {index} out of bounds for sequence of length {length}")]
    IndexOutOfBound {
        /// The requested index
        index: i64,
        /// The sequence length at the time of access
        length: usize,
    },

    /// No sequence element satisfied a `[key=value]` filter
    #[error("no element with {key}={value} found in sequence '{sequence}'")]
    MapNotFound {
        /// The filter key
        key: String,
        /// The filter value
        value: String,
        /// The field naming the filtered sequence
        sequence: String,
    },

    /// Substring substitution was misapplied or its pattern did not match
    #[error("substring substitution: {message}")]
    PatternSubstring {
        /// Description of the failure
        message: String,
    },

    /// Read-only source traversal reached a mapping without the requested key
    #[error("field '{field}' not found in source document")]
    FieldNotFound {
        /// The missing field name
        field: String,
    },
}

impl ReplacementError {
    /// Create a bad-configuration error
    pub fn bad_configuration(message: impl Into<String>) -> Self {
        Self::BadConfiguration {
            message: message.into(),
        }
    }

    /// Create a type-mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Create a pattern-substring error
    pub fn pattern_substring(message: impl Into<String>) -> Self {
        Self::PatternSubstring {
            message: message.into(),
        }
    }

    /// Create a field-not-found error
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a filter-match-not-found error
    pub fn map_not_found(
        key: impl Into<String>,
        value: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Self {
        Self::MapNotFound {
            key: key.into(),
            value: value.into(),
            sequence: sequence.into(),
        }
    }
}
