//! Statement analysis and error recovery over whole files.

use pretty_assertions::assert_eq;
use protoparse::parser::analyze;
use protoparse::parser::ast::{NodeKind, ParseNode};

fn kinds(nodes: &[ParseNode]) -> Vec<NodeKind> {
    nodes.iter().map(|n| n.kind).collect()
}

#[test_log::test]
fn test_malformed_line_does_not_stop_analysis() {
    let tree = analyze(
        r#"syntax = "proto3";
package shop;
import "common.proto";
option go_package = "example.com/shop";
this line is not a statement
// Inventory records.
message Item {
  string sku = 1;
}
enum Unit {
  UNIT_UNSPECIFIED = 0;
}
service Stock {
  rpc Get(Item) returns (Item);
}
"#,
    );

    assert_eq!(
        kinds(tree.statements()),
        vec![
            NodeKind::Syntax,
            NodeKind::Package,
            NodeKind::Import,
            NodeKind::Option,
            NodeKind::Comment,
            NodeKind::Message,
            NodeKind::Enum,
            NodeKind::Service,
        ]
    );
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].token.line, 5);
    assert_eq!(
        tree.errors[0].message,
        "unknown top-level statement 'this'"
    );
}

#[test_log::test]
fn test_every_bad_line_is_reported() {
    let tree = analyze(
        r#"syntax = "proto4";
package ;
message Good {
  int32 a = 1;
  int32 b = ;
  map<float, string> m = 3;
  reserved "foo", 5;
}
"#,
    );

    let messages: Vec<&str> = tree.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "unrecognized syntax identifier 'proto4'",
            "expected package name, found ';'",
            "expected field number, found ';'",
            "expected map key type (integral, bool or string), found 'float'",
            "reserved statement cannot mix field names and numbers",
        ]
    );

    let message = &tree.statements()[0];
    assert_eq!(message.kind, NodeKind::Message);
    assert_eq!(message.children_of(NodeKind::Field).count(), 1);
    assert!(!message.has_child(NodeKind::Map));
    assert!(!message.has_child(NodeKind::Reserved));
}

#[test]
fn test_map_key_must_be_eligible() {
    let tree = analyze("message M {\n  map<float, string> m = 1;\n}");
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].token.lexeme, "float");
    assert!(!tree.statements()[0].has_child(NodeKind::Map));
}

#[test]
fn test_reserved_cannot_mix_kinds() {
    for source in [
        "message M {\n  reserved \"foo\", 5;\n}",
        "message M {\n  reserved 5, \"foo\";\n}",
    ] {
        let tree = analyze(source);
        assert_eq!(tree.errors.len(), 1, "{source}");
        assert!(!tree.statements()[0].has_child(NodeKind::Reserved));
    }
}

#[test]
fn test_unterminated_block_is_fatal() {
    let tree = analyze("syntax = \"proto3\";\nmessage Open {\n  int32 a = 1;\n");
    assert_eq!(kinds(tree.statements()), vec![NodeKind::Syntax]);
    assert_eq!(tree.errors.len(), 1);
    assert!(tree.errors[0].is_fatal());
    assert_eq!(tree.errors[0].token.lexeme, "{");
}

#[test]
fn test_unterminated_block_comment_is_fatal() {
    let tree = analyze("package a;\n/* never closed\nmessage M {}\n");
    assert_eq!(kinds(tree.statements()), vec![NodeKind::Package]);
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].message, "unterminated block comment");
}

#[test]
fn test_apostrophes_in_comments() {
    let tree = analyze("/* it's the id */ message A {}\nmessage B {}\n");
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    assert_eq!(
        kinds(tree.statements()),
        vec![NodeKind::Comment, NodeKind::Message, NodeKind::Message]
    );

    let tree = analyze("/* Don't touch */ \nmessage A {}\n// don't either\nmessage B {}\n");
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    assert_eq!(
        kinds(tree.statements()),
        vec![
            NodeKind::Comment,
            NodeKind::Message,
            NodeKind::Comment,
            NodeKind::Message,
        ]
    );
}

#[test]
fn test_apostrophe_in_member_comment() {
    let tree = analyze("message A {\n  int32 x = 1; /* user's id */ \n}\nmessage B {}\n");
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    assert_eq!(
        kinds(tree.statements()),
        vec![NodeKind::Message, NodeKind::Message]
    );
    let a = &tree.statements()[0];
    assert_eq!(
        kinds(&a.children),
        vec![NodeKind::Identifier, NodeKind::Field, NodeKind::Comment]
    );
    assert_eq!(a.child(NodeKind::Comment).unwrap().children[0].value, "user's id");
}

#[test]
fn test_identical_trees_are_equal() {
    let source = "message Point {\n  int32 x = 1;\n  int32 y = 2;\n}\n";
    assert_eq!(analyze(source), analyze(source));
    assert_eq!(analyze(source), analyze(&source.replace("Point", "POINT")));

    let built = ParseNode::root().with_child(
        ParseNode::new(NodeKind::Message, "message")
            .with_child(ParseNode::new(NodeKind::Identifier, "Point"))
            .with_child(field("x", "1"))
            .with_child(field("y", "2")),
    );
    assert_eq!(analyze(source).root, built);
}

#[test]
fn test_any_single_change_breaks_equality() {
    let tree = analyze("message Point {\n  int32 x = 1;\n  int32 y = 2;\n}\n");

    let renamed = analyze("message Point {\n  int32 x = 1;\n  int32 z = 2;\n}\n");
    let retyped = analyze("message Point {\n  int32 x = 1;\n  int64 y = 2;\n}\n");
    let reordered = analyze("message Point {\n  int32 y = 2;\n  int32 x = 1;\n}\n");
    assert_ne!(tree, renamed);
    assert_ne!(tree, retyped);
    assert_ne!(tree, reordered);

    let mut changed_kind = tree.root.clone();
    changed_kind.children[0].kind = NodeKind::Enum;
    assert_ne!(tree.root, changed_kind);
}

#[test]
fn test_tree_display() {
    let tree = analyze("package a.b;\n");
    assert_eq!(
        tree.root.to_string(),
        "Root\n  Package 'package'\n    Identifier 'a.b'\n"
    );
}

fn field(name: &str, number: &str) -> ParseNode {
    ParseNode::new(NodeKind::Field, "")
        .with_child(ParseNode::new(NodeKind::Type, "int32"))
        .with_child(ParseNode::new(NodeKind::Identifier, name))
        .with_child(ParseNode::new(NodeKind::FieldNumber, number))
}
