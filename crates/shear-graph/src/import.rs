use serde::Serialize;

use crate::span::SourceSpan;

/// One top-level `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDeclaration {
    /// Module specifier, e.g. `"./utils.js"`.
    pub source: String,
    /// Named specifiers in source order. Default and namespace bindings are
    /// not represented.
    pub specifiers: Vec<ImportSpecifier>,
    /// Span of the whole declaration, including its trailing semicolon.
    pub span: SourceSpan,
}

/// A named binding inside an import declaration (`{ imported as local }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSpecifier {
    /// Name exported by the target module.
    pub imported: String,
    /// Span of the local binding. Its source text is what usage matching
    /// compares against.
    pub local: SourceSpan,
}

impl ImportDeclaration {
    /// Source text of each named specifier's local binding.
    pub fn local_names<'s>(&self, source: &'s str) -> impl Iterator<Item = &'s str> {
        self.specifiers
            .iter()
            .filter_map(move |spec| spec.local.text(source))
    }
}
