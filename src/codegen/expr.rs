use crate::ast::ast::{AstNode, NodeKind};
use crate::codegen::codegen::{oil_type, Codegen};
use crate::symtable::symtable::ScopeId;
use crate::types::types::TypeSig;

const RELATIONAL: [&str; 6] = ["<", "<=", ">", ">=", "==", "!="];

impl Codegen<'_> {
    /// Lowers an expression, emitting whatever temporary lines it
    /// needs, and returns the text naming its result.
    pub(crate) fn gen_expr(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        match node.kind {
            NodeKind::Binop => self.gen_binop(node, scope, depth),
            NodeKind::Unop => self.gen_unop(node, scope, depth),
            NodeKind::Call => self.gen_call_expr(node, scope, depth),
            NodeKind::Variable => self.gen_variable(node, scope, depth),
            NodeKind::Constant => self.gen_constant(node),
            NodeKind::Allocator => self.gen_allocator(node, scope, depth),
            NodeKind::NewArray => self.gen_newarray(node, scope, depth),
            _ => String::new(),
        }
    }

    /// Constants lower to their own text; `false`/`null` become `0`,
    /// `true` becomes `1`, string literals reuse their hoisted
    /// temporary.
    fn gen_constant(&mut self, node: &AstNode) -> String {
        let literal = &node.children[0];
        match literal.kind {
            NodeKind::False | NodeKind::Null => "0".to_string(),
            NodeKind::True => "1".to_string(),
            NodeKind::StringCon => {
                let text = literal.text(self.strings);
                match self.string_temp(text) {
                    Some(temp) => temp.to_string(),
                    None => text.to_string(),
                }
            }
            _ => literal.text(self.strings).to_string(),
        }
    }

    /// Plain references mangle by use-time classification; `a.b` emits
    /// `base.f_T_b` with `T` recovered from the base's checked type;
    /// `a[i]` emits `base[index]`.
    fn gen_variable(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        let head = &node.children[0];

        if node.children.len() == 1 && head.kind == NodeKind::Ident {
            return self.mangle(scope, head.text(self.strings));
        }

        match head.text(self.strings) {
            "." => {
                let base_node = &head.children[0];
                let base_type = self.expr_type(base_node, scope);
                let base = self.gen_expr(base_node, scope, depth);
                let field = head.children[1].text(self.strings);
                format!("{}.f_{}_{}", base, base_type, field)
            }
            "[" => {
                let base = self.gen_expr(&head.children[0], scope, depth);
                let index = self.gen_expr(&head.children[1], scope, depth);
                format!("{}[{}]", base, index)
            }
            _ => String::new(),
        }
    }

    /// Relational operators always allocate a byte-category temporary;
    /// arithmetic ones allocate in the left operand's post-array-strip
    /// category. Assignment in expression position emits the store and
    /// names the left side.
    fn gen_binop(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        let op = node.children[1].text(self.strings).to_string();
        let left_type = self.expr_type(&node.children[0], scope);
        let left = self.gen_expr(&node.children[0], scope, depth);
        let right = self.gen_expr(&node.children[2], scope, depth);

        if op == "=" {
            self.emit(depth, &format!("{} = {};", left, right));
            return left;
        }

        let (decl, temp) = if RELATIONAL.contains(&op.as_str()) {
            (oil_type(&TypeSig::Bool), self.fresh_temp(&TypeSig::Bool))
        } else {
            let category = left_type.strip_array().clone();
            (oil_type(&category), self.fresh_temp(&category))
        };
        self.emit(
            depth,
            &format!("{}{} = {} {} {};", decl, temp, left, op, right),
        );
        temp
    }

    /// `ord` and `chr` lower to casts; any other unary operator wraps
    /// its operand.
    fn gen_unop(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        let op = &node.children[0];
        let operand = self.gen_expr(&op.children[0], scope, depth);
        match op.kind {
            NodeKind::Ord => format!("(int){}", operand),
            NodeKind::Chr => format!("(ubyte){}", operand),
            _ => format!("({}{})", op.text(self.strings), operand),
        }
    }

    /// An expression-level call allocates a temporary in the callee's
    /// return category; a `void` callee is emitted as a bare call and
    /// names nothing.
    fn gen_call_expr(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        let name = node.children[0].text(self.strings);
        let callee = format!("__{}", name);
        let args = self.gen_args(node, scope, depth);

        let ret = self
            .scopes
            .table
            .lookup_quiet(scope, name)
            .and_then(|sig| sig.signature_parts().ok())
            .and_then(|parts| parts.into_iter().next())
            .unwrap_or(TypeSig::Unknown);

        if ret == TypeSig::Void {
            self.emit(depth, &format!("{} ({});", callee, args));
            return String::new();
        }

        let temp = self.fresh_temp(&ret);
        self.emit(
            depth,
            &format!("{}{} = {} ({});", oil_type(&ret), temp, callee, args),
        );
        temp
    }

    pub(crate) fn gen_args(&mut self, node: &AstNode, scope: ScopeId, depth: usize) -> String {
        node.children[1..]
            .iter()
            .map(|arg| self.gen_expr(arg, scope, depth))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `new T` in expression position: zero-initialized allocation
    /// sized to the struct, named by a fresh pointer temporary.
    pub(crate) fn gen_allocator(
        &mut self,
        node: &AstNode,
        scope: ScopeId,
        depth: usize,
    ) -> String {
        let sig = self.expr_type(node, scope);
        let temp = self.fresh_pointer();
        self.emit(
            depth,
            &format!(
                "struct s_{} *{} = xcalloc (1, sizeof (struct s_{}));",
                sig, temp, sig
            ),
        );
        temp
    }

    /// `new T[n]`: zero-initialized allocation of `n` elements, named
    /// by a fresh pointer temporary.
    pub(crate) fn gen_newarray(
        &mut self,
        node: &AstNode,
        scope: ScopeId,
        depth: usize,
    ) -> String {
        let sig = self.expr_type(node, scope);
        let count = self.gen_expr(&node.children[1], scope, depth);
        let element = sig.element().cloned().unwrap_or(TypeSig::Unknown);
        let temp = self.fresh_temp(&sig);
        self.emit(
            depth,
            &format!(
                "{}{} = xcalloc ({}, sizeof ({}));",
                oil_type(&sig),
                temp,
                count,
                oil_type(&element).trim_end()
            ),
        );
        temp
    }
}
