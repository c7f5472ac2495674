use std::io::{self, Write};

use rustc_hash::FxHashMap;

use crate::ast::ast::{AstNode, NodeKind};
use crate::stringset::StringSet;
use crate::symtable::symtable::{ScopeId, Scopes};
use crate::type_checker::type_checker::TypeChecker;
use crate::types::types::TypeSig;

pub(crate) const INDENT: usize = 8;

/// The code generator.
///
/// Expressions return the temporary name or identifier text naming
/// their result; statements append finished lines to the output buffer.
/// All counters are owned here and only ever increase, so every
/// temporary and label of a compilation unit is unique.
///
/// The generator assumes the tree already passed the type checker; the
/// embedded checker instance is only used to recompute expression types
/// for register-category and field-mangling decisions, and its
/// diagnostics are discarded.
pub struct Codegen<'a> {
    pub(crate) strings: &'a StringSet,
    pub(crate) scopes: &'a Scopes,
    pub(crate) checker: TypeChecker<'a>,
    pub(crate) out: String,

    i_counter: usize,
    b_counter: usize,
    p_counter: usize,
    s_counter: usize,
    ifelse_counter: usize,
    while_counter: usize,

    /// Distinct string literal text to its hoisted temporary, and the
    /// temporaries in first-seen order for emission.
    string_temps: FxHashMap<String, String>,
    string_order: Vec<(String, String)>,
}

/// Lowers `tree` to intermediate code on `out`. Must only be called
/// after a clean type check.
pub fn generate_code(
    out: &mut impl Write,
    tree: &AstNode,
    scopes: &Scopes,
    strings: &StringSet,
) -> io::Result<()> {
    let mut gen = Codegen::new(scopes, strings);
    gen.generate(tree);
    out.write_all(gen.out.as_bytes())
}

impl<'a> Codegen<'a> {
    pub fn new(scopes: &'a Scopes, strings: &'a StringSet) -> Self {
        Codegen {
            strings,
            scopes,
            checker: TypeChecker::new(scopes, strings),
            out: String::new(),
            i_counter: 1,
            b_counter: 1,
            p_counter: 1,
            s_counter: 1,
            ifelse_counter: 1,
            while_counter: 1,
            string_temps: FxHashMap::default(),
            string_order: Vec::new(),
        }
    }

    /// Emits the whole compilation unit: preamble, struct definitions,
    /// global variable declarations, hoisted string literals, user
    /// functions, then the synthesized entry point holding the global
    /// statements.
    pub fn generate(&mut self, tree: &AstNode) {
        log::debug!("generating intermediate code");
        self.hoist_strings(tree);

        self.out.push_str("#define __OCLIB_C__\n");
        self.out.push_str("#include \"oclib.oh\"\n");

        self.emit_structs();
        self.emit_globals();
        self.emit_string_temps();

        for child in &tree.children {
            if child.kind == NodeKind::Function {
                self.emit_function(child);
            }
        }

        self.out.push_str("\nvoid __ocmain ()\n{\n");
        for child in &tree.children {
            match child.kind {
                NodeKind::Function | NodeKind::Prototype | NodeKind::StructDecl => {}
                _ => self.gen_statement(child, self.scopes.globals, 1, true),
            }
        }
        self.out.push_str("}\n");
    }

    /// Pre-scans the tree for string literals: each distinct text gets
    /// one string-category temporary, reused at every reference.
    fn hoist_strings(&mut self, node: &AstNode) {
        if node.kind == NodeKind::StringCon {
            let text = node.text(self.strings).to_string();
            if !self.string_temps.contains_key(&text) {
                let temp = self.fresh_temp(&TypeSig::Str);
                self.string_temps.insert(text.clone(), temp.clone());
                self.string_order.push((temp, text));
            }
        }
        for child in &node.children {
            self.hoist_strings(child);
        }
    }

    fn emit_structs(&mut self) {
        let mut lines = String::new();
        for (name, sig) in self.scopes.table.symbols(self.scopes.types) {
            if *sig != TypeSig::StructDef {
                continue;
            }
            lines.push_str(&format!("\nstruct s_{} {{\n", name));
            if let Some(fields) = self
                .scopes
                .table
                .function_scope_quiet(self.scopes.types, name)
            {
                for (fname, ftype) in self.scopes.table.symbols(fields) {
                    lines.push_str(&format!(
                        "{:indent$}{}f_{}_{};\n",
                        "",
                        oil_type(ftype),
                        name,
                        fname,
                        indent = INDENT
                    ));
                }
            }
            lines.push_str("};\n");
        }
        self.out.push_str(&lines);
    }

    fn emit_globals(&mut self) {
        let mut lines = String::new();
        for (name, sig) in self.scopes.table.symbols(self.scopes.globals) {
            if sig.is_function() {
                continue;
            }
            lines.push_str(&format!("\n{}__{};", oil_type(sig), name));
        }
        if !lines.is_empty() {
            lines.push('\n');
        }
        self.out.push_str(&lines);
    }

    fn emit_string_temps(&mut self) {
        if self.string_order.is_empty() {
            return;
        }
        self.out.push('\n');
        let lines: String = self
            .string_order
            .iter()
            .map(|(temp, text)| format!("ubyte *{} = {};\n", temp, text))
            .collect();
        self.out.push_str(&lines);
    }

    /// Emits one user function: raw return type, mangled name, one
    /// parameter per line in the function's own scope, then the body.
    fn emit_function(&mut self, node: &AstNode) {
        let name = node.children[1].text(self.strings);
        let fn_scope = match node.scope {
            Some(scope) => scope,
            None => self.scopes.globals,
        };
        let Some(sig) = self.scopes.table.lookup_quiet(self.scopes.globals, name) else {
            return;
        };
        let Ok(parts) = sig.signature_parts() else {
            return;
        };

        self.out.push_str(&format!("\n{}\n__{}(\n", parts[0], name));

        let params: Vec<String> = match node.children.get(2) {
            Some(list) if list.kind == NodeKind::ParamList => list
                .children
                .iter()
                .zip(parts[1..].iter())
                .map(|(param, ptype)| {
                    let pname = param.children[1].text(self.strings);
                    format!(
                        "{:indent$}{}_{}_{}",
                        "",
                        oil_type(ptype),
                        fn_scope,
                        pname,
                        indent = INDENT
                    )
                })
                .collect(),
            _ => Vec::new(),
        };
        if params.is_empty() {
            self.out.push_str(")\n");
        } else {
            self.out.push_str(&params.join(",\n"));
            self.out.push_str(")\n");
        }

        self.out.push_str("{\n");
        for child in &node.children {
            if child.kind == NodeKind::Block {
                for stmt in &child.children {
                    self.gen_statement(stmt, fn_scope, 1, false);
                }
            }
        }
        self.out.push_str("}\n");
    }

    /// Appends one indented line of output.
    pub(crate) fn emit(&mut self, depth: usize, line: &str) {
        self.out
            .push_str(&format!("{:indent$}{}\n", "", line, indent = depth * INDENT));
    }

    /// Allocates a fresh temporary in `sig`'s register category: `iN`
    /// for int, `bN` for byte-sized, `pN` for array shapes, `sN` for
    /// everything else.
    pub(crate) fn fresh_temp(&mut self, sig: &TypeSig) -> String {
        let (prefix, counter) = match sig {
            TypeSig::Int => ("i", &mut self.i_counter),
            TypeSig::Bool | TypeSig::Char => ("b", &mut self.b_counter),
            TypeSig::Array(_) => ("p", &mut self.p_counter),
            _ => ("s", &mut self.s_counter),
        };
        let temp = format!("{}{}", prefix, counter);
        *counter += 1;
        temp
    }

    /// Allocates a fresh pointer temporary for heap allocations.
    pub(crate) fn fresh_pointer(&mut self) -> String {
        let temp = format!("p{}", self.p_counter);
        self.p_counter += 1;
        temp
    }

    /// Label number for the next `if`/`ifelse`, taken on entry so
    /// nested constructs get distinct labels.
    pub(crate) fn next_ifelse_label(&mut self) -> usize {
        let label = self.ifelse_counter;
        self.ifelse_counter += 1;
        label
    }

    pub(crate) fn next_while_label(&mut self) -> usize {
        let label = self.while_counter;
        self.while_counter += 1;
        label
    }

    pub(crate) fn string_temp(&self, text: &str) -> Option<&str> {
        self.string_temps.get(text).map(String::as_str)
    }

    /// Mangles an identifier reference, re-classified at use time: a
    /// name declared in a non-root scope of the chain becomes
    /// `_<definingScopeId>_name`, a global becomes `__name`, anything
    /// else (already a temporary) passes through.
    pub(crate) fn mangle(&self, scope: ScopeId, name: &str) -> String {
        if self.scopes.table.is_local(scope, name) {
            match self.scopes.table.defining_scope(scope, name) {
                Some(def) => format!("_{}_{}", def, name),
                None => name.to_string(),
            }
        } else if self.scopes.table.is_global(scope, name) {
            format!("__{}", name)
        } else {
            name.to_string()
        }
    }

    /// The checked type of an expression, with diagnostics discarded.
    pub(crate) fn expr_type(&mut self, node: &AstNode, scope: ScopeId) -> TypeSig {
        self.checker.check_expr(node, scope)
    }
}

/// Renders a signature as its oil declaration type, trailing separator
/// included.
pub fn oil_type(sig: &TypeSig) -> String {
    match sig {
        TypeSig::Bool | TypeSig::Char => "ubyte ".to_string(),
        TypeSig::Int => "int ".to_string(),
        TypeSig::Str => "ubyte *".to_string(),
        TypeSig::Void => "void ".to_string(),
        TypeSig::Named(name) => format!("struct s_{} ", name),
        TypeSig::Array(element) => match element.as_ref() {
            TypeSig::Bool | TypeSig::Char => "ubyte *".to_string(),
            TypeSig::Int => "int *".to_string(),
            TypeSig::Str => "ubyte **".to_string(),
            TypeSig::Named(name) => format!("struct s_{} **", name),
            other => format!("{} *", other),
        },
        other => format!("{} ", other),
    }
}
