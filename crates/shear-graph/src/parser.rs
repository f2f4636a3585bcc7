//! Parser adapter.
//!
//! The oxc syntax tree is arena-allocated and never leaves this module. Parsing
//! produces a [`ParsedModule`]: the tagged subset of the tree the elimination
//! pass consumes (top-level import declarations, top-level call callees and
//! their spans).

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, ImportDeclarationSpecifier, ModuleExportName, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::import::{ImportDeclaration, ImportSpecifier};
use crate::span::SourceSpan;

/// The parser rejected a module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .diagnostics.join("; "))]
pub struct SyntaxError {
    pub diagnostics: Vec<String>,
}

/// Everything the elimination pass needs to know about one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModule {
    /// Top-level import declarations in source order.
    pub imports: Vec<ImportDeclaration>,
    /// Spans of identifiers that are the direct callee of a top-level call
    /// statement, in source order.
    pub used_callees: Vec<SourceSpan>,
}

/// Parse `source` as an ECMAScript module using the latest syntax.
pub fn parse_module(source: &str) -> Result<ParsedModule, SyntaxError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let mut diagnostics: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        if diagnostics.is_empty() {
            diagnostics.push("parser aborted".to_string());
        }
        return Err(SyntaxError { diagnostics });
    }

    let mut parsed = ParsedModule::default();
    for stmt in &ret.program.body {
        match stmt {
            Statement::ImportDeclaration(import) => {
                let mut specifiers = Vec::new();
                if let Some(specs) = &import.specifiers {
                    for spec in specs {
                        // Default and namespace bindings are never collected.
                        if let ImportDeclarationSpecifier::ImportSpecifier(named) = spec {
                            let imported = match &named.imported {
                                ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
                                ModuleExportName::IdentifierReference(ident) => {
                                    ident.name.to_string()
                                }
                                ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
                            };
                            specifiers.push(ImportSpecifier {
                                imported,
                                local: named.local.span.into(),
                            });
                        }
                    }
                }
                parsed.imports.push(ImportDeclaration {
                    source: import.source.value.to_string(),
                    specifiers,
                    span: import.span.into(),
                });
            }
            Statement::ExpressionStatement(expr_stmt) => {
                // Parentheses are kept in the tree; `(h)()` still calls `h`.
                if let Expression::CallExpression(call) = expr_stmt.expression.without_parentheses()
                {
                    if let Expression::Identifier(callee) = call.callee.without_parentheses() {
                        parsed.used_callees.push(callee.span.into());
                    }
                }
            }
            _ => {}
        }
    }

    Ok(parsed)
}
