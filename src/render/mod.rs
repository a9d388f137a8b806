//! Filtered bundle output
//!
//! Rendering prints the documents a selector matches, in stream order, as a
//! `---` separated YAML stream. This is the read-only counterpart to the
//! transform path: nothing is mutated and nothing is created.

use std::io::Write;

use crate::document::{DocumentBundle, Selector};

/// Write the documents matching `selector` to `output`
pub fn render(
    bundle: &DocumentBundle,
    selector: &Selector,
    output: &mut dyn Write,
) -> crate::Result<()> {
    bundle.select_bundle(selector).write(output)
}
