use crate::ast::ast::{AstNode, NodeKind};
use crate::codegen::codegen::{oil_type, Codegen};
use crate::symtable::symtable::ScopeId;
use crate::types::types::TypeSig;

impl Codegen<'_> {
    /// Lowers one statement. `global` is true while emitting the
    /// top-level statements collected into the entry point, where
    /// variable storage was already declared at file scope.
    pub(crate) fn gen_statement(
        &mut self,
        node: &AstNode,
        scope: ScopeId,
        depth: usize,
        global: bool,
    ) {
        match node.kind {
            NodeKind::VarDecl => self.gen_vardecl(node, scope, depth, global),
            NodeKind::Binop => self.gen_assign_or_expr(node, scope, depth),
            NodeKind::Call => self.gen_call_stmt(node, scope, depth),
            NodeKind::If => self.gen_if(node, scope, depth, global),
            NodeKind::IfElse => self.gen_ifelse(node, scope, depth, global),
            NodeKind::While => self.gen_while(node, scope, depth, global),
            NodeKind::Return => self.gen_return(node, scope, depth),
            NodeKind::ReturnVoid => self.emit(depth, "return;"),
            NodeKind::Block => {
                for stmt in &node.children {
                    self.gen_statement(stmt, scope, depth, global);
                }
            }
            _ => {
                self.gen_expr(node, scope, depth);
            }
        }
    }

    /// Declarations: allocator and new-array initializers emit the
    /// heap allocation then bind the declared name; ordinary global
    /// declarations emit a plain store into the file-scope variable;
    /// ordinary locals emit the type-qualified declaration.
    fn gen_vardecl(&mut self, node: &AstNode, scope: ScopeId, depth: usize, global: bool) {
        let name = node.children[1].text(self.strings).to_string();
        let mangled = self.mangle(scope, &name);
        let declared = self
            .scopes
            .table
            .lookup_quiet(scope, &name)
            .unwrap_or(TypeSig::Unknown);
        let init = &node.children[2];

        match init.kind {
            NodeKind::Allocator => {
                let temp = self.gen_allocator(init, scope, depth);
                self.bind(&mangled, &declared, &temp, depth, global);
            }
            NodeKind::NewArray => {
                let temp = self.gen_newarray(init, scope, depth);
                self.bind(&mangled, &declared, &temp, depth, global);
            }
            _ => {
                let value = self.gen_expr(init, scope, depth);
                if global && depth == 1 {
                    self.emit(depth, &format!("{} = {};", mangled, value));
                } else {
                    self.emit(
                        depth,
                        &format!("{}{} = {};", oil_type(&declared), mangled, value),
                    );
                }
            }
        }
    }

    fn bind(&mut self, mangled: &str, declared: &TypeSig, temp: &str, depth: usize, global: bool) {
        if global && depth == 1 {
            self.emit(depth, &format!("{} = {};", mangled, temp));
        } else {
            self.emit(
                depth,
                &format!("{}{} = {};", oil_type(declared), mangled, temp),
            );
        }
    }

    /// Assignments store into the lowered left side; any other binop in
    /// statement position just evaluates for its temporary line.
    fn gen_assign_or_expr(&mut self, node: &AstNode, scope: ScopeId, depth: usize) {
        if node.children[1].text(self.strings) == "=" {
            let left = self.gen_expr(&node.children[0], scope, depth);
            let right = self.gen_expr(&node.children[2], scope, depth);
            self.emit(depth, &format!("{} = {};", left, right));
        } else {
            self.gen_expr(node, scope, depth);
        }
    }

    /// A statement-level call never allocates a result temporary.
    fn gen_call_stmt(&mut self, node: &AstNode, scope: ScopeId, depth: usize) {
        let name = node.children[0].text(self.strings);
        let args = self.gen_args(node, scope, depth);
        self.emit(depth, &format!("__{} ({});", name, args));
    }

    fn gen_if(&mut self, node: &AstNode, scope: ScopeId, depth: usize, global: bool) {
        let label = self.next_ifelse_label();
        let cond = self.gen_expr(&node.children[0], scope, depth);
        self.emit(depth, &format!("if (!{}) goto fi_{};", cond, label));

        let body_scope = node.scope.unwrap_or(scope);
        self.gen_statement(&node.children[1], body_scope, depth + 1, global);

        self.emit(depth, &format!("fi_{}:;", label));
    }

    fn gen_ifelse(&mut self, node: &AstNode, scope: ScopeId, depth: usize, global: bool) {
        let label = self.next_ifelse_label();
        let cond = self.gen_expr(&node.children[0], scope, depth);
        self.emit(depth, &format!("if (!{}) goto else_{};", cond, label));

        let then_scope = node.scope.unwrap_or(scope);
        self.gen_statement(&node.children[1], then_scope, depth + 1, global);
        self.emit(depth + 1, &format!("goto fi_{};", label));

        self.emit(depth, &format!("else_{}:;", label));
        let else_block = &node.children[2];
        let else_scope = else_block.scope.unwrap_or(scope);
        self.gen_statement(else_block, else_scope, depth + 1, global);

        self.emit(depth, &format!("fi_{}:;", label));
    }

    fn gen_while(&mut self, node: &AstNode, scope: ScopeId, depth: usize, global: bool) {
        let label = self.next_while_label();
        self.emit(depth, &format!("while_{}:;", label));

        let cond = self.gen_expr(&node.children[0], scope, depth + 1);
        self.emit(depth + 1, &format!("if (!{}) goto break_{};", cond, label));

        let body_scope = node.scope.unwrap_or(scope);
        self.gen_statement(&node.children[1], body_scope, depth + 1, global);

        self.emit(depth + 1, &format!("goto while_{};", label));
        self.emit(depth, &format!("break_{}:;", label));
    }

    fn gen_return(&mut self, node: &AstNode, scope: ScopeId, depth: usize) {
        let value = self.gen_expr(&node.children[0], scope, depth);
        self.emit(depth, &format!("return {};", value));
    }
}
