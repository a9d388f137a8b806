//! Replacement rule configuration
//!
//! The rule schema mirrors the plugin configuration document:
//!
//! ```yaml
//! replacements:
//!   - source:
//!       objref: {kind: Cluster, name: c1}
//!       fieldref: spec.controlPlaneEndpoint.host
//!     target:
//!       objref: {kind: KubeadmConfig}
//!       fieldrefs: ["spec.clusterConfiguration.apiServer.certSANs[0]"]
//! ```
//!
//! A source is either an object reference (`objref`, optionally narrowed by
//! `fieldref`) or a literal `value` - never both. Validation runs once over
//! the whole rule set before any mutation is attempted, so one malformed
//! rule rejects the configuration before side effects occur.

use serde::{Deserialize, Serialize};

use super::error::ReplacementError;
use crate::document::Selector;

/// Source field extracted when `fieldref` is unset
pub const DEFAULT_SOURCE_FIELD: &str = "metadata.name";

/// Reference to a document by group-version-kind, name, and namespace
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    /// API group of the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// API version of the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Kind of the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// `metadata.name` of the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `metadata.namespace` of the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectReference {
    /// The selector equivalent of this reference
    pub fn to_selector(&self) -> Selector {
        Selector {
            group: self.group.clone().filter(|s| !s.is_empty()),
            version: self.version.clone().filter(|s| !s.is_empty()),
            kind: self.kind.clone().filter(|s| !s.is_empty()),
            name: self.name.clone().filter(|s| !s.is_empty()),
            namespace: self.namespace.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// Where a replacement value comes from
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSource {
    /// Document to extract the value from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objref: Option<ObjectReference>,

    /// Literal value, mutually exclusive with `objref`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Field path to extract from the referenced document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fieldref: Option<String>,
}

impl ReplacementSource {
    /// The literal value, when one is configured (empty counts as unset)
    pub fn literal(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// The field path to extract, defaulting to `metadata.name`
    pub fn field_path(&self) -> &str {
        self.fieldref
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_SOURCE_FIELD)
    }
}

/// Where a replacement value is written
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementTarget {
    /// Documents to mutate
    #[serde(default)]
    pub objref: ObjectReference,

    /// Field paths to write on every matched document
    #[serde(default)]
    pub fieldrefs: Vec<String>,
}

/// One replacement rule: a source and the targets it feeds
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Where the value comes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ReplacementSource>,

    /// Where the value is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ReplacementTarget>,
}

/// The decoded replacement rule set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementConfig {
    /// Rules, applied in order
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl ReplacementConfig {
    /// Reject malformed rule sets before any mutation is attempted
    pub fn validate(&self) -> Result<(), ReplacementError> {
        for replacement in &self.replacements {
            let Some(source) = &replacement.source else {
                return Err(ReplacementError::bad_configuration(
                    "every replacement must specify a source",
                ));
            };
            if replacement.target.is_none() {
                return Err(ReplacementError::bad_configuration(
                    "every replacement must specify a target",
                ));
            }
            match (&source.objref, source.literal()) {
                (Some(_), Some(_)) => {
                    return Err(ReplacementError::bad_configuration(
                        "a replacement source cannot set both objref and value",
                    ));
                }
                (None, None) => {
                    return Err(ReplacementError::bad_configuration(
                        "a replacement source must set one of objref or value",
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
