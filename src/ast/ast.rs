use std::io::{self, Write};

use crate::stringset::{StringId, StringSet};
use crate::symtable::symtable::ScopeId;
use crate::Location;

/// Grammar symbol of a syntax tree node.
///
/// The first group are the interior productions, the second the leaf
/// tokens. The parser guarantees the child shapes documented on each
/// variant; the semantic passes never restructure the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Program root; children are top-level statements and declarations.
    Root,
    /// `[type, Ident, ParamList?, Block]`
    Function,
    /// `[type, Ident, ParamList?]` - declaration without a body.
    Prototype,
    Block,
    /// Children are `VarDecl`-shaped `[type, Ident]` parameter pairs.
    ParamList,
    /// `[type, Ident, initializer]`, or `[type, Ident]` for parameters.
    VarDecl,
    /// `[type, Ident]` struct field.
    FieldDecl,
    /// `[condition, Block]`
    If,
    /// `[condition, Block, Block]`
    IfElse,
    /// `[condition, Block]`
    While,
    /// `[expression]`
    Return,
    ReturnVoid,
    /// `[Ident, argument...]`
    Call,
    /// `[lhs, Operator, rhs]`
    Binop,
    /// `[op-node [operand]]` where the op node is `Ord`, `Chr` or `Operator`.
    Unop,
    /// `new T`; single leaf child naming the allocated type.
    Allocator,
    /// `new T[n]`; `[Basetype, size-expression]`
    NewArray,
    /// `[leaf]` or `[leaf, Operator "[]"]` for the array form.
    Basetype,
    /// `[literal leaf]`
    Constant,
    /// `[Ident]`, `[Operator "." [expr, Ident]]` or `[Operator "[" [expr, index]]`
    Variable,
    /// `[Ident, FieldDecl...]`
    StructDecl,

    Ident,
    /// A struct name in type position.
    TypeId,
    Number,
    StringCon,
    CharCon,
    True,
    False,
    Null,
    Void,
    Bool,
    Char,
    Int,
    StringKw,
    Ord,
    Chr,
    Operator,
}

/// One n-way node of the syntax tree.
///
/// Nodes carry no parent links; traversals keep parent context on the
/// call stack. `scope` starts out `None` and is written exactly once by
/// the scope builder for the nodes that introduce a scope.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: NodeKind,
    pub location: Location,
    pub lexinfo: StringId,
    pub children: Vec<AstNode>,
    pub scope: Option<ScopeId>,
}

impl AstNode {
    pub fn new(kind: NodeKind, location: Location, lexinfo: StringId) -> Self {
        AstNode {
            kind,
            location,
            lexinfo,
            children: Vec::new(),
            scope: None,
        }
    }

    /// Appends a child and returns the node, parser style.
    pub fn adopt(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn adopt2(self, left: AstNode, right: AstNode) -> Self {
        self.adopt(left).adopt(right)
    }

    pub fn text<'a>(&self, strings: &'a StringSet) -> &'a str {
        strings.resolve(self.lexinfo)
    }
}

fn dump_rec(
    out: &mut impl Write,
    node: &AstNode,
    strings: &StringSet,
    depth: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "{:indent$}{:?} ({})",
        "",
        node.kind,
        node.text(strings),
        indent = depth * 2
    )?;
    for child in &node.children {
        dump_rec(out, child, strings, depth + 1)?;
    }
    Ok(())
}

/// Writes an indented listing of the tree, one node per line, for the
/// driver's `.ast` artifact.
pub fn dump(out: &mut impl Write, root: &AstNode, strings: &StringSet) -> io::Result<()> {
    dump_rec(out, root, strings, 0)
}
