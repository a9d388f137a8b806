//! Keel - document-processing engine for bare-metal Kubernetes cluster lifecycle
//!
//! Keel is the configuration-document layer of a CLI orchestrator that drives
//! bare-metal Kubernetes clusters. Cluster provisioning renders large sets of
//! YAML documents, and most site-specific customization is expressed as
//! *replacements*: copy a value out of one document (or take a literal) and
//! write it into field paths of other documents.
//!
//! # Architecture
//!
//! - A [`document::DocumentBundle`] holds an ordered, in-memory collection of
//!   YAML documents and answers [`document::Selector`] queries
//! - Document plugins implement [`document::plugin::Plugin`] and are
//!   instantiated from configuration documents through a
//!   [`document::plugin::PluginRegistry`]
//! - The replacement transformer
//!   ([`document::plugin::replacement::ReplacementTransformer`]) parses
//!   field-path expressions and mutates target documents in place
//!
//! # Modules
//!
//! - [`document`] - document model, selectors, bundles, and plugins
//! - [`render`] - filtered bundle output
//! - [`error`] - error types for the engine

#![deny(missing_docs)]

pub mod document;
pub mod error;
pub mod render;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
