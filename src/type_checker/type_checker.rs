use crate::ast::ast::{AstNode, NodeKind};
use crate::errors::errors::{Diagnostics, SemanticError};
use crate::stringset::StringSet;
use crate::symtable::symtable::{ScopeId, Scopes};
use crate::types::types::TypeSig;

/// Tree-walking type checker.
///
/// Every check reports its own diagnostic at the point of failure and
/// returns the unknown sentinel instead of stopping, so a single error
/// cascades through the rest of the analysis rather than aborting it.
/// The walk re-enters the scopes recorded by the build pass through an
/// explicit current-scope cursor; no state is shared with other passes.
pub struct TypeChecker<'a> {
    strings: &'a StringSet,
    scopes: &'a Scopes,
    pub diags: Diagnostics,
}

/// Type checks `tree` and returns the collected diagnostics. The caller
/// decides whether to go on to code generation based on
/// [`Diagnostics::has_errors`].
pub fn type_check(tree: &AstNode, scopes: &Scopes, strings: &StringSet) -> Diagnostics {
    let mut checker = TypeChecker::new(scopes, strings);
    checker.run(tree);
    log::debug!(
        "type check finished with {} diagnostic(s)",
        checker.diags.len()
    );
    checker.diags
}

impl<'a> TypeChecker<'a> {
    pub fn new(scopes: &'a Scopes, strings: &'a StringSet) -> Self {
        TypeChecker {
            strings,
            scopes,
            diags: Diagnostics::new(),
        }
    }

    /// Walks all top-level statements and function bodies.
    pub fn run(&mut self, root: &AstNode) {
        for child in &root.children {
            match child.kind {
                NodeKind::Function => {
                    let name = self.text(&child.children[1]);
                    let fn_scope = self
                        .scopes
                        .table
                        .function_scope_quiet(self.scopes.globals, name)
                        .unwrap_or(self.scopes.globals);
                    for stmt in child
                        .children
                        .iter()
                        .filter(|c| c.kind == NodeKind::Block)
                        .flat_map(|block| block.children.iter())
                    {
                        self.check_statement(stmt, fn_scope);
                    }
                }
                NodeKind::Prototype | NodeKind::StructDecl => {}
                _ => {
                    self.check_statement(child, self.scopes.globals);
                }
            }
        }
    }

    fn text(&self, node: &AstNode) -> &'a str {
        self.strings.resolve(node.lexinfo)
    }

    /// Statement-level checks. `values` is the current value scope.
    pub fn check_statement(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        match node.kind {
            NodeKind::VarDecl => self.check_vardecl(node, values),
            NodeKind::While => self.check_while(node, values),
            NodeKind::If | NodeKind::IfElse => self.check_ifelse(node, values),
            NodeKind::Return | NodeKind::ReturnVoid => self.check_return(node, values),
            NodeKind::Block => {
                for stmt in &node.children {
                    self.check_statement(stmt, values);
                }
                TypeSig::Unknown
            }
            _ => self.check_expr(node, values),
        }
    }

    /// Computes the type of an expression node.
    pub fn check_expr(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        match node.kind {
            NodeKind::Binop => self.check_binop(node, values),
            NodeKind::Unop => self.check_unop(node, values),
            NodeKind::Allocator => self.check_allocator(node, values),
            NodeKind::Call => self.check_call(node, values),
            NodeKind::Variable => self.check_variable(node, values),
            NodeKind::Constant => self.check_constant(node),
            NodeKind::NewArray => self.check_newarray(node, values),
            _ => TypeSig::Unknown,
        }
    }

    /// A constant's type is fixed by its lexical kind.
    fn check_constant(&mut self, node: &AstNode) -> TypeSig {
        match node.children[0].kind {
            NodeKind::Number => TypeSig::Int,
            NodeKind::StringCon => TypeSig::Str,
            NodeKind::CharCon => TypeSig::Char,
            NodeKind::True | NodeKind::False => TypeSig::Bool,
            NodeKind::Null => TypeSig::Null,
            _ => TypeSig::Unknown,
        }
    }

    /// Plain references resolve through the scope chain; `a.b` resolves
    /// the field inside `a`'s struct scope; `a[i]` requires an `int`
    /// index and yields the element type (`char` for strings).
    fn check_variable(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let head = &node.children[0];

        if node.children.len() == 1 && head.kind == NodeKind::Ident {
            return self.scopes.table.lookup(
                values,
                self.text(head),
                node.location,
                &mut self.diags,
            );
        }

        match self.text(head) {
            "." => {
                let base = self.check_expr(&head.children[0], values);
                let field = self.text(&head.children[1]);
                let struct_scope = self.scopes.table.function_scope(
                    self.scopes.types,
                    &base.to_string(),
                    node.location,
                    &mut self.diags,
                );
                match struct_scope {
                    Some(scope) => {
                        self.scopes
                            .table
                            .lookup(scope, field, node.location, &mut self.diags)
                    }
                    None => TypeSig::Unknown,
                }
            }
            "[" => {
                let index = self.check_expr(&head.children[1], values);
                if index != TypeSig::Int {
                    self.diags
                        .report(SemanticError::InvalidIndexType, node.location);
                    return TypeSig::Unknown;
                }
                match self.check_expr(&head.children[0], values) {
                    TypeSig::Str => TypeSig::Char,
                    TypeSig::Array(element) => *element,
                    other => other,
                }
            }
            _ => TypeSig::Unknown,
        }
    }

    /// A call's type is the declared return type of its callee.
    /// Parameter types are not positionally enforced; only a mismatched
    /// argument count is flagged, as a warning.
    fn check_call(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let name = self.text(&node.children[0]);
        let sig = self
            .scopes
            .table
            .lookup(values, name, node.location, &mut self.diags);

        match sig.signature_parts() {
            Ok(parts) => {
                let expected = parts.len() - 1;
                let received = node.children.len() - 1;
                if expected != received {
                    self.diags.warn(
                        SemanticError::CallArityMismatch { expected, received },
                        node.location,
                    );
                }
                parts.into_iter().next().unwrap_or(TypeSig::Unknown)
            }
            Err(error) => {
                if !sig.is_unknown() {
                    self.diags.report(error, node.location);
                }
                TypeSig::Unknown
            }
        }
    }

    /// `ord` takes an `int` or `char` and yields `int`; `chr` takes a
    /// `char` and yields `char`; every other unary operator passes its
    /// operand's type through.
    fn check_unop(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let op = &node.children[0];
        let operand = self.check_expr(&op.children[0], values);

        match op.kind {
            NodeKind::Ord => {
                if operand != TypeSig::Int && operand != TypeSig::Char {
                    self.diags
                        .report(SemanticError::InvalidUnaryOperandType, node.location);
                    operand
                } else {
                    TypeSig::Int
                }
            }
            NodeKind::Chr => {
                if operand != TypeSig::Char {
                    self.diags
                        .report(SemanticError::InvalidUnaryOperandType, node.location);
                    operand
                } else {
                    TypeSig::Char
                }
            }
            _ => operand,
        }
    }

    /// `new T`: an identifier resolves through the value scope, any
    /// other type leaf names the resulting type directly.
    fn check_allocator(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let leaf = &node.children[0];
        match leaf.kind {
            NodeKind::Ident => {
                self.scopes
                    .table
                    .lookup(values, self.text(leaf), node.location, &mut self.diags)
            }
            _ => self.leaf_base_type(leaf, values, node),
        }
    }

    /// `new T[n]`: the size must be an `int`, the result is `T[]`.
    fn check_newarray(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let size = self.check_expr(&node.children[1], values);
        if size != TypeSig::Int {
            self.diags
                .report(SemanticError::InvalidIndexType, node.location);
        }

        let element = self.check_basetype(&node.children[0], values);
        TypeSig::array_of(element)
    }

    fn check_basetype(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        match node.children.first() {
            Some(leaf) => self.leaf_base_type(leaf, values, node),
            None => TypeSig::Unknown,
        }
    }

    fn leaf_base_type(&mut self, leaf: &AstNode, values: ScopeId, node: &AstNode) -> TypeSig {
        match leaf.kind {
            NodeKind::Void => TypeSig::Void,
            NodeKind::Bool => TypeSig::Bool,
            NodeKind::Char => TypeSig::Char,
            NodeKind::Int => TypeSig::Int,
            NodeKind::StringKw => TypeSig::Str,
            NodeKind::TypeId => TypeSig::Named(self.text(leaf).to_string()),
            NodeKind::Ident => {
                self.scopes
                    .table
                    .lookup(values, self.text(leaf), node.location, &mut self.diags)
            }
            _ => TypeSig::Unknown,
        }
    }

    fn check_binop(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let left = self.check_expr(&node.children[0], values);
        let right = self.check_expr(&node.children[2], values);
        self.are_compatible(&left, &right, node)
    }

    /// The coercion table. First match wins:
    ///
    /// 1. a base type (or its array form) on either side requires the
    ///    other side to be that base type, its array form, or `null`;
    ///    `string[]` against `char` is accepted as `char` (an array of
    ///    chars stands in for a string);
    /// 2. identical signatures;
    /// 3. `null` on the right is assignable to anything remaining;
    /// 4. otherwise a type mismatch.
    ///
    /// An unknown sentinel operand re-reports as an unresolved name and
    /// stays unknown, so one failed lookup cascades instead of crashing.
    /// Every assignment, initializer and binary expression funnels
    /// through here.
    pub fn are_compatible(&mut self, left: &TypeSig, right: &TypeSig, node: &AstNode) -> TypeSig {
        use TypeSig::{Bool, Char, Int, Null, Str, Unknown};

        if left.is_unknown() || right.is_unknown() {
            // The sentinel renders as the empty string; the lookup that
            // produced it already named the identifier.
            self.diags.report(
                SemanticError::UnknownIdentifier {
                    name: String::new(),
                },
                node.location,
            );
            return Unknown;
        }

        for base in [Bool, Int, Char, Str] {
            let array = TypeSig::array_of(base.clone());
            let left_in = *left == base || *left == array;
            let right_in = *right == base || *right == array;
            if !left_in && !right_in {
                continue;
            }

            let string_array = TypeSig::array_of(Str);
            if (*left == string_array && *right == Char)
                || (*left == Char && *right == string_array)
            {
                return Char;
            }
            if (left_in || *left == Null) && (right_in || *right == Null) {
                return base;
            }
            self.diags.report(
                SemanticError::InvalidConversion {
                    to: base.to_string(),
                },
                node.location,
            );
            return Unknown;
        }

        if left == right {
            return left.clone();
        }
        if *right == Null {
            return left.clone();
        }

        self.diags.report(
            SemanticError::TypeMismatch {
                left: left.to_string(),
                right: right.to_string(),
            },
            node.location,
        );
        Unknown
    }

    /// A declaration requires its initializer to be compatible with the
    /// declared type recorded by the build pass.
    fn check_vardecl(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let name = self.text(&node.children[1]);
        let declared = self
            .scopes
            .table
            .lookup(values, name, node.location, &mut self.diags);
        let init = self.check_expr(&node.children[2], values);
        self.are_compatible(&declared, &init, node)
    }

    /// A loop condition must be `bool`; the body is checked inside the
    /// scope recorded on the node during the build pass.
    fn check_while(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let cond = self.check_expr(&node.children[0], values);
        if cond != TypeSig::Bool {
            self.diags
                .report(SemanticError::ConditionNotBoolean, node.location);
            return TypeSig::Unknown;
        }

        let body_scope = node.scope.unwrap_or(values);
        self.check_statement(&node.children[1], body_scope)
    }

    /// `if`/`ifelse` conditions must be `bool`; each branch is checked
    /// inside its own recorded scope.
    fn check_ifelse(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        let cond = self.check_expr(&node.children[0], values);
        if cond != TypeSig::Bool {
            self.diags
                .report(SemanticError::ConditionNotBoolean, node.location);
            return TypeSig::Unknown;
        }

        let then_scope = node.scope.unwrap_or(values);
        self.check_statement(&node.children[1], then_scope);

        if node.kind == NodeKind::IfElse {
            let else_block = &node.children[2];
            let else_scope = else_block.scope.unwrap_or(values);
            self.check_statement(else_block, else_scope);
        }

        TypeSig::Bool
    }

    /// Computes the returned expression's type. The match against the
    /// enclosing function's declared return type is intentionally not
    /// enforced beyond this lookup.
    fn check_return(&mut self, node: &AstNode, values: ScopeId) -> TypeSig {
        if node.children.is_empty() {
            TypeSig::Void
        } else {
            self.check_expr(&node.children[0], values)
        }
    }
}
