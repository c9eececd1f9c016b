//! Rust bindings for the `tree-sitter-heptagon` grammar.
//!
//! This follows the standard layout used by Tree-sitter grammars so that
//! consumers can link the generated parser for the Heptagon synchronous
//! dataflow language and obtain a `tree_sitter::Language` handle.
//!
//! ```
//! let mut parser = tree_sitter_heptagon::parser().expect("Error loading heptagon grammar");
//! let tree = parser
//!     .parse("node id(x : int) returns (y : int) let y = x tel", None)
//!     .unwrap();
//! assert!(!tree.root_node().has_error());
//! ```

use tree_sitter::{Language, Parser};
use tree_sitter_language::LanguageFn;

mod error;
mod verify;

pub use error::GrammarLoadError;
pub use verify::{verify_grammar_loads, verify_language};

extern "C" {
    fn tree_sitter_heptagon() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for this grammar.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_heptagon) };

/// Name the grammar is generated under, as declared in tree-sitter.json.
pub const GRAMMAR_NAME: &str = env!("TREE_SITTER_GRAMMAR_NAME");

/// The syntax highlighting query for this grammar.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");

/// Returns the Tree-sitter [`Language`] for this grammar.
pub fn language() -> Language {
    LANGUAGE.into()
}

/// Creates a [`Parser`] with the heptagon grammar already set.
pub fn parser() -> Result<Parser, GrammarLoadError> {
    verify::load(LANGUAGE).map(|(_, parser)| parser)
}
