//! Document selectors
//!
//! A [`Selector`] names a set of documents by group, version, kind, name, and
//! namespace. Every field is optional; an unset field matches anything, so an
//! empty selector matches every document in a bundle.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Document;

/// A group-version-kind/name/namespace document query
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// API group to match (unset matches any group)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// API version to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Kind to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// `metadata.name` to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `metadata.namespace` to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Selector {
    /// Create a selector that matches every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the selector to an API group, version, and kind
    pub fn by_gvk(
        mut self,
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.group = non_empty(group.into());
        self.version = non_empty(version.into());
        self.kind = non_empty(kind.into());
        self
    }

    /// Restrict the selector to a `metadata.name`
    pub fn by_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_empty(name.into());
        self
    }

    /// Restrict the selector to a `metadata.namespace`
    pub fn by_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = non_empty(namespace.into());
        self
    }

    /// Whether the document satisfies every set field of this selector
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(group) = &self.group {
            if document.group() != group {
                return false;
            }
        }
        if let Some(version) = &self.version {
            if document.version() != version {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if document.kind() != Some(kind.as_str()) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if document.name() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(namespace) = &self.namespace {
            if document.namespace() != Some(namespace.as_str()) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(group) = &self.group {
            parts.push(format!("group={group}"));
        }
        if let Some(version) = &self.version {
            parts.push(format!("version={version}"));
        }
        if let Some(kind) = &self.kind {
            parts.push(format!("kind={kind}"));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if let Some(namespace) = &self.namespace {
            parts.push(format!("namespace={namespace}"));
        }
        if parts.is_empty() {
            return write!(f, "<any document>");
        }
        write!(f, "{}", parts.join(", "))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
