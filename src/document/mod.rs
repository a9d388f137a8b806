//! Document model for Keel
//!
//! A [`Document`] is one YAML document: a tree of mappings, sequences, and
//! scalars represented as [`serde_yaml::Value`] and mutated in place by the
//! plugins. Documents are identified by group-version-kind plus
//! name/namespace, read from the conventional Kubernetes fields.
//!
//! # Modules
//!
//! - [`bundle`] - ordered in-memory document collections
//! - [`plugin`] - the plugin contract and registry
//! - [`selector`] - group-version-kind/name/namespace document queries

pub mod bundle;
pub mod plugin;
pub mod selector;

pub use bundle::DocumentBundle;
pub use selector::Selector;

use serde_yaml::Value;

/// One YAML configuration document
///
/// The tree is owned by the document and mutated in place; identity accessors
/// read the standard `apiVersion`/`kind`/`metadata` fields and return `None`
/// when a field is absent or not a string.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    content: Value,
}

impl Document {
    /// Wrap a parsed YAML tree as a document
    pub fn new(content: Value) -> Self {
        Self { content }
    }

    /// Parse a single YAML document
    pub fn parse(input: &str) -> crate::Result<Self> {
        Ok(Self::new(serde_yaml::from_str(input)?))
    }

    /// The document's `apiVersion` field
    pub fn api_version(&self) -> Option<&str> {
        self.content.get("apiVersion").and_then(Value::as_str)
    }

    /// The API group portion of `apiVersion` (empty for core-group documents)
    pub fn group(&self) -> &str {
        match self.api_version() {
            Some(api_version) => match api_version.split_once('/') {
                Some((group, _)) => group,
                None => "",
            },
            None => "",
        }
    }

    /// The API version portion of `apiVersion`
    pub fn version(&self) -> &str {
        match self.api_version() {
            Some(api_version) => match api_version.split_once('/') {
                Some((_, version)) => version,
                None => api_version,
            },
            None => "",
        }
    }

    /// The document's `kind` field
    pub fn kind(&self) -> Option<&str> {
        self.content.get("kind").and_then(Value::as_str)
    }

    /// The document's `metadata.name` field
    pub fn name(&self) -> Option<&str> {
        self.content
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
    }

    /// The document's `metadata.namespace` field
    pub fn namespace(&self) -> Option<&str> {
        self.content
            .get("metadata")
            .and_then(|metadata| metadata.get("namespace"))
            .and_then(Value::as_str)
    }

    /// Borrow the document tree
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Mutably borrow the document tree
    pub fn content_mut(&mut self) -> &mut Value {
        &mut self.content
    }

    /// Serialize the document back to YAML
    pub fn to_yaml(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(&self.content)?)
    }
}
