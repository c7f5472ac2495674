//! Unit tests for syntax tree construction and dumping.

use crate::ast::ast::{dump, AstNode, NodeKind};
use crate::stringset::StringSet;
use crate::Location;

fn leaf(set: &mut StringSet, kind: NodeKind, text: &str) -> AstNode {
    AstNode::new(kind, Location::new(0, 1, 0), set.intern(text))
}

#[test]
fn test_adopt_preserves_order() {
    let mut set = StringSet::new();
    let tree = leaf(&mut set, NodeKind::Root, "")
        .adopt(leaf(&mut set, NodeKind::Ident, "first"))
        .adopt(leaf(&mut set, NodeKind::Ident, "second"));

    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].text(&set), "first");
    assert_eq!(tree.children[1].text(&set), "second");
}

#[test]
fn test_adopt2_appends_both() {
    let mut set = StringSet::new();
    let left = leaf(&mut set, NodeKind::Number, "1");
    let right = leaf(&mut set, NodeKind::Number, "2");
    let op = leaf(&mut set, NodeKind::Operator, "+").adopt2(left, right);

    assert_eq!(op.children.len(), 2);
    assert_eq!(op.children[1].text(&set), "2");
}

#[test]
fn test_scope_starts_unset() {
    let mut set = StringSet::new();
    let node = leaf(&mut set, NodeKind::While, "");
    assert!(node.scope.is_none());
}

#[test]
fn test_dump_indents_children() {
    let mut set = StringSet::new();
    let tree = leaf(&mut set, NodeKind::Root, "").adopt(leaf(&mut set, NodeKind::Ident, "x"));

    let mut out = Vec::new();
    dump(&mut out, &tree, &set).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "Root ()\n  Ident (x)\n");
}
