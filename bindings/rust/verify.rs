use tree_sitter::{Language, Parser};
use tree_sitter_language::LanguageFn;

use crate::error::GrammarLoadError;

/// Checks that the bundled heptagon grammar loads into the tree-sitter runtime.
pub fn verify_grammar_loads() -> Result<Language, GrammarLoadError> {
    verify_language(crate::LANGUAGE)
}

/// Builds a [`Language`] from `language_fn` and checks the runtime accepts it.
///
/// A null descriptor is reported as [`GrammarLoadError::NullLanguage`] instead of
/// being handed to the runtime.
pub fn verify_language(language_fn: LanguageFn) -> Result<Language, GrammarLoadError> {
    load(language_fn).map(|(language, _)| language)
}

/// Like [`verify_language`], but hands back the parser that accepted the language.
pub(crate) fn load(language_fn: LanguageFn) -> Result<(Language, Parser), GrammarLoadError> {
    let builder = language_fn.into_raw();
    // SAFETY: generated entry points take no arguments and return a static pointer.
    if unsafe { builder() }.is_null() {
        tracing::warn!("heptagon grammar descriptor is null");
        return Err(GrammarLoadError::NullLanguage);
    }

    // SAFETY: `builder` came from a `LanguageFn` and returned a non-null language.
    let language = Language::new(unsafe { LanguageFn::from_raw(builder) });

    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&language) {
        tracing::warn!(abi = language.abi_version(), %err, "runtime rejected heptagon grammar");
        return Err(GrammarLoadError::Incompatible(err));
    }

    tracing::debug!(
        abi = language.abi_version(),
        node_kinds = language.node_kind_count(),
        "loaded heptagon grammar"
    );
    Ok((language, parser))
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    unsafe extern "C" fn null_descriptor() -> *const () {
        ptr::null()
    }

    // Large enough to cover every field the runtime reads before rejecting ABI 0.
    #[repr(C, align(8))]
    struct ZeroedLanguage([u8; 1024]);

    static ZEROED_LANGUAGE: ZeroedLanguage = ZeroedLanguage([0; 1024]);

    unsafe extern "C" fn zeroed_descriptor() -> *const () {
        ptr::addr_of!(ZEROED_LANGUAGE).cast()
    }

    #[test]
    fn grammar_can_be_loaded() {
        if let Err(err) = verify_grammar_loads() {
            panic!("{err}");
        }
    }

    #[test]
    fn null_descriptor_is_reported_not_dereferenced() {
        let Err(err) = verify_language(unsafe { LanguageFn::from_raw(null_descriptor) }) else {
            panic!("null descriptor produced a language");
        };

        assert!(matches!(err, GrammarLoadError::NullLanguage));
        assert_eq!(err.to_string(), "Error loading heptagon grammar");
    }

    #[test]
    fn repeated_checks_agree() {
        let (Ok(first), Ok(second)) = (verify_grammar_loads(), verify_grammar_loads()) else {
            panic!("Error loading heptagon grammar");
        };

        assert_eq!(first.abi_version(), second.abi_version());
        assert_eq!(first.node_kind_count(), second.node_kind_count());

        let messages: Vec<_> = (0..2)
            .map(|_| match verify_language(unsafe { LanguageFn::from_raw(null_descriptor) }) {
                Ok(_) => panic!("null descriptor produced a language"),
                Err(err) => err.to_string(),
            })
            .collect();
        assert_eq!(messages[0], messages[1]);
    }

    #[test]
    fn runtime_accepts_abi_version() {
        let Ok(language) = verify_grammar_loads() else {
            panic!("Error loading heptagon grammar");
        };

        assert!(language.abi_version() >= tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION);
        assert!(language.abi_version() <= tree_sitter::LANGUAGE_VERSION);
    }

    #[test]
    fn unsupported_abi_is_incompatible() {
        let Err(err) = verify_language(unsafe { LanguageFn::from_raw(zeroed_descriptor) }) else {
            panic!("ABI 0 language was accepted");
        };

        assert!(matches!(err, GrammarLoadError::Incompatible(_)));
        let message = err.to_string();
        assert!(
            message.starts_with("Error loading heptagon grammar: "),
            "unexpected message {message}"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
