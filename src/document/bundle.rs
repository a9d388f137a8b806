//! In-memory document collections
//!
//! A [`DocumentBundle`] owns an ordered list of documents decoded from a
//! multi-document YAML stream. Plugins query it with [`Selector`]s and mutate
//! the matched documents in place; the bundle serializes back to a stream
//! with `---` separators in its original document order.

use std::io::{Read, Write};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use super::{Document, Selector};

/// An ordered, in-memory collection of YAML documents
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentBundle {
    documents: Vec<Document>,
}

impl DocumentBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a multi-document YAML stream
    ///
    /// Empty documents (blank `---` sections) are dropped.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let mut documents = Vec::new();
        for deserializer in serde_yaml::Deserializer::from_str(input) {
            let value = Value::deserialize(deserializer)?;
            if value.is_null() {
                continue;
            }
            documents.push(Document::new(value));
        }
        debug!(count = documents.len(), "decoded document bundle");
        Ok(Self { documents })
    }

    /// Decode a multi-document YAML stream from a reader
    pub fn from_reader(input: &mut dyn Read) -> crate::Result<Self> {
        let mut data = String::new();
        input.read_to_string(&mut data)?;
        Self::parse(&data)
    }

    /// Serialize every document to the writer, `---` separated
    pub fn write(&self, output: &mut dyn Write) -> crate::Result<()> {
        for (i, document) in self.documents.iter().enumerate() {
            if i > 0 {
                writeln!(output, "---")?;
            }
            output.write_all(document.to_yaml()?.as_bytes())?;
        }
        Ok(())
    }

    /// Append a document to the bundle
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// All documents, in stream order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents in the bundle
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the bundle holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents matching the selector, in stream order
    pub fn select(&self, selector: &Selector) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|document| selector.matches(document))
            .collect()
    }

    /// Mutable references to documents matching the selector
    pub fn select_mut(&mut self, selector: &Selector) -> Vec<&mut Document> {
        self.documents
            .iter_mut()
            .filter(|document| selector.matches(document))
            .collect()
    }

    /// A new bundle holding copies of the documents matching the selector
    pub fn select_bundle(&self, selector: &Selector) -> Self {
        Self {
            documents: self
                .select(selector)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}
