use crate::ast::ast::{AstNode, NodeKind};
use crate::stringset::StringSet;
use crate::symtable::symtable::{ScopeId, ScopeTable, Scopes};
use crate::types::types::TypeSig;

/// The scope-building pass: one depth-first walk that creates every
/// scope of the compilation unit, registers every declaration, and
/// annotates scope-introducing nodes with the id of their new scope.
///
/// Name errors are not reported here; unresolved references surface in
/// the later passes.
pub struct ScopeBuilder<'a> {
    strings: &'a StringSet,
    table: ScopeTable,
}

/// Builds the value and type scope forests for `tree`.
pub fn build_scopes(tree: &mut AstNode, strings: &StringSet) -> Scopes {
    let mut builder = ScopeBuilder {
        strings,
        table: ScopeTable::new(),
    };
    let globals = builder.table.new_root();
    let types = builder.table.new_root();

    log::debug!("building scopes (globals {}, types {})", globals, types);
    builder.build(tree, globals, types);

    Scopes {
        table: builder.table,
        globals,
        types,
    }
}

impl ScopeBuilder<'_> {
    fn build(&mut self, node: &mut AstNode, values: ScopeId, types: ScopeId) {
        match node.kind {
            NodeKind::Function | NodeKind::Prototype => {
                self.build_function(node, values, types);
            }
            NodeKind::VarDecl => {
                let sig = self.declared_type(&node.children[0]);
                let name_node = &node.children[1];
                self.table.add_symbol(
                    values,
                    self.strings.resolve(name_node.lexinfo),
                    sig,
                    name_node.location,
                );
                for child in &mut node.children {
                    self.build(child, values, types);
                }
            }
            NodeKind::If | NodeKind::While => {
                let block = self.table.enter_block(values);
                node.scope = Some(block);
                for child in &mut node.children {
                    self.build(child, block, types);
                }
            }
            NodeKind::IfElse => {
                // The then and else branches each get their own scope;
                // the node records the then-scope, the else block records
                // its own.
                let then_scope = self.table.enter_block(values);
                node.scope = Some(then_scope);
                self.build(&mut node.children[0], values, types);
                self.build(&mut node.children[1], then_scope, types);

                let else_scope = self.table.enter_block(values);
                node.children[2].scope = Some(else_scope);
                let else_block = &mut node.children[2];
                for child in &mut else_block.children {
                    self.build(child, else_scope, types);
                }
            }
            NodeKind::StructDecl => {
                self.build_struct(node, types);
            }
            _ => {
                for child in &mut node.children {
                    self.build(child, values, types);
                }
            }
        }
    }

    fn build_function(&mut self, node: &mut AstNode, values: ScopeId, types: ScopeId) {
        let ret = self.declared_type(&node.children[0]);
        let name = self.strings.resolve(node.children[1].lexinfo).to_string();
        let decl = node.children[1].location;

        let params: Vec<TypeSig> = match node.children.get(2) {
            Some(list) if list.kind == NodeKind::ParamList => list
                .children
                .iter()
                .map(|param| self.declared_type(&param.children[0]))
                .collect(),
            _ => Vec::new(),
        };

        let sig = TypeSig::Function {
            ret: Box::new(ret),
            params,
        };
        let fn_scope = self.table.enter_function(values, &name, sig, decl);
        node.scope = Some(fn_scope);
        log::debug!("function {} gets scope {}", name, fn_scope);

        if let Some(list) = node.children.get(2) {
            if list.kind == NodeKind::ParamList {
                for param in &list.children {
                    let ptype = self.declared_type(&param.children[0]);
                    let pname = &param.children[1];
                    self.table.add_symbol(
                        fn_scope,
                        self.strings.resolve(pname.lexinfo),
                        ptype,
                        pname.location,
                    );
                }
            }
        }

        // The function body shares the parameter scope; only the
        // statements inside it can introduce further scopes.
        for child in &mut node.children {
            if child.kind == NodeKind::Block {
                for stmt in &mut child.children {
                    self.build(stmt, fn_scope, types);
                }
            }
        }
    }

    fn build_struct(&mut self, node: &mut AstNode, types: ScopeId) {
        let name = self.strings.resolve(node.children[0].lexinfo).to_string();
        let decl = node.children[0].location;

        let struct_scope = self
            .table
            .enter_function(types, &name, TypeSig::StructDef, decl);
        node.scope = Some(struct_scope);

        for field in &node.children[1..] {
            let ftype = self.declared_type(&field.children[0]);
            let fname = &field.children[1];
            self.table.add_symbol(
                struct_scope,
                self.strings.resolve(fname.lexinfo),
                ftype,
                fname.location,
            );
        }
    }

    /// Computes the declared type of a `Basetype` node structurally: the
    /// leaf names the base type (an identifier names a struct), an
    /// `[]` marker makes it an array.
    fn declared_type(&self, node: &AstNode) -> TypeSig {
        let base = match node.children.first() {
            Some(leaf) => self.leaf_type(leaf),
            None => self.leaf_type(node),
        };
        match node.children.get(1) {
            Some(marker) if self.strings.resolve(marker.lexinfo) == "[]" => {
                TypeSig::array_of(base)
            }
            _ => base,
        }
    }

    fn leaf_type(&self, leaf: &AstNode) -> TypeSig {
        match leaf.kind {
            NodeKind::Void => TypeSig::Void,
            NodeKind::Bool => TypeSig::Bool,
            NodeKind::Char => TypeSig::Char,
            NodeKind::Int => TypeSig::Int,
            NodeKind::StringKw => TypeSig::Str,
            NodeKind::Ident | NodeKind::TypeId => {
                TypeSig::Named(self.strings.resolve(leaf.lexinfo).to_string())
            }
            _ => TypeSig::Unknown,
        }
    }
}
