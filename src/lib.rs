#![allow(clippy::module_inception)]

use std::fmt::Display;
use std::io;

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod stringset;
pub mod symtable;
pub mod type_checker;
pub mod types;

use ast::ast::AstNode;
use errors::errors::Diagnostics;
use stringset::StringSet;
use symtable::build::build_scopes;
use symtable::symtable::Scopes;

/// Source position of a token: index into the driver's filename stack,
/// line number, and column offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: usize, line: usize, column: usize) -> Self {
        Location { file, line, column }
    }

    pub fn null() -> Self {
        Location {
            file: 0,
            line: 0,
            column: 0,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.file, self.line, self.column)
    }
}

/// Runs the full semantic pipeline over a parsed tree: builds the scope
/// tables, type checks, and, if no error was reported, writes the
/// intermediate code to `out`.
///
/// Returns the scope tables and the collected diagnostics so the driver
/// can produce the symbol listing and report errors however it likes.
pub fn compile(
    tree: &mut AstNode,
    strings: &StringSet,
    out: &mut impl io::Write,
) -> io::Result<(Scopes, Diagnostics)> {
    let scopes = build_scopes(tree, strings);
    let diags = type_checker::type_checker::type_check(tree, &scopes, strings);

    if diags.has_errors() {
        log::debug!(
            "type check failed with {} error(s), skipping code generation",
            diags.error_count()
        );
        return Ok((scopes, diags));
    }

    codegen::codegen::generate_code(out, tree, &scopes, strings)?;
    Ok((scopes, diags))
}
