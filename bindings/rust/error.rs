use thiserror::Error;

/// Failure to turn the generated grammar into a usable [`tree_sitter::Language`].
#[derive(Debug, Error)]
pub enum GrammarLoadError {
    /// The grammar descriptor produced a null language pointer.
    #[error("Error loading heptagon grammar")]
    NullLanguage,
    /// The runtime refused the language, usually an ABI version mismatch.
    #[error("Error loading heptagon grammar: {0}")]
    Incompatible(#[source] tree_sitter::LanguageError),
}
