//! Document plugin contract and registry
//!
//! A document plugin is constructed from a configuration document and
//! transforms a [`DocumentBundle`]. Plugins are selected by the
//! `apiVersion`/`kind` of their configuration document through a
//! [`PluginRegistry`], so a pipeline can name transformations in
//! configuration without linking to concrete types.
//!
//! # Modules
//!
//! - [`replacement`] - the replacement transformer

pub mod replacement;

use std::collections::HashMap;
use std::io::{Read, Write};

use serde_yaml::Value;

use super::DocumentBundle;
use crate::Error;

/// A document-processing plugin
///
/// `transform` is the composable entrypoint used inside multi-stage
/// pipelines; `run` wraps it for standalone stream processing.
pub trait Plugin {
    /// Mutate the bundle in place
    fn transform(&self, bundle: &mut DocumentBundle) -> crate::Result<()>;

    /// Decode a document stream, transform it, and serialize the result
    fn run(&self, input: &mut dyn Read, output: &mut dyn Write) -> crate::Result<()> {
        let mut bundle = DocumentBundle::from_reader(input)?;
        self.transform(&mut bundle)?;
        bundle.write(output)
    }
}

/// Factory function instantiating a plugin from its configuration document
pub type PluginFactory = fn(Value) -> crate::Result<Box<dyn Plugin>>;

/// Registry mapping plugin configuration identities to factories
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<(String, String), PluginFactory>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for configuration documents with the given identity
    pub fn register(
        &mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
        factory: PluginFactory,
    ) {
        self.factories
            .insert((api_version.into(), kind.into()), factory);
    }

    /// Instantiate the plugin named by the configuration document's identity
    pub fn create(&self, config: Value) -> crate::Result<Box<dyn Plugin>> {
        let api_version = identity_field(&config, "apiVersion")?;
        let kind = identity_field(&config, "kind")?;
        let factory = self
            .factories
            .get(&(api_version.clone(), kind.clone()))
            .ok_or_else(|| Error::unknown_plugin(api_version, kind))?;
        factory(config)
    }
}

fn identity_field(config: &Value, field: &str) -> crate::Result<String> {
    config
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::malformed_plugin_config(field))
}

/// Registry pre-populated with the built-in plugins
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(
        replacement::API_VERSION,
        replacement::KIND,
        |config| Ok(Box::new(replacement::ReplacementTransformer::new(config)?)),
    );
    registry
}
