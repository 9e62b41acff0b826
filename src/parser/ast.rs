//! Parse tree produced by the syntax analyzer.

use std::fmt;

use crate::error::ParseError;

/// The label of a parse tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeKind {
    Root,
    Comment,
    CommentText,
    Identifier,
    Syntax,
    Package,
    Import,
    ImportModifier,
    Option,
    OptionValue,
    Enum,
    EnumConstant,
    Message,
    Field,
    FieldNumber,
    /// A scalar field type
    Type,
    /// A message or enum type reference
    UserType,
    Repeated,
    Optional,
    Map,
    MapKey,
    MapValue,
    OneOf,
    Reserved,
    /// A reserved number or the start of a reserved range
    Range,
    /// `to N` / `to max` of a reserved range
    RangeEnd,
    Service,
    ServiceMethod,
    MethodInput,
    MethodOutput,
    Stream,
    StringLiteral,
}

/// A labeled node with ordered children.
///
/// Nodes do not point at their parents; depth is tracked by whoever walks
/// the tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseNode {
    pub kind: NodeKind,
    pub value: String,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(kind: NodeKind, value: impl Into<String>) -> Self {
        ParseNode {
            kind,
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        ParseNode::new(NodeKind::Root, "")
    }

    /// Builder-style append, used while an analyzer assembles its node.
    pub fn with_child(mut self, child: ParseNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: ParseNode) {
        self.children.push(child);
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    /// First child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// All children of the given kind, in order.
    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &ParseNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn has_child(&self, kind: NodeKind) -> bool {
        self.child(kind).is_some()
    }

    /// Visit this node and its descendants depth-first with their depth.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ParseNode, usize)) {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            visit(node, depth);
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

impl PartialEq for ParseNode {
    fn eq(&self, other: &Self) -> bool {
        if self.is_root() || other.is_root() {
            return self.kind == other.kind && self.children == other.children;
        }
        self.kind == other.kind
            && self.value.eq_ignore_ascii_case(&other.value)
            && self.children == other.children
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.walk(&mut |node, depth| {
            if result.is_ok() {
                result = if node.value.is_empty() {
                    writeln!(f, "{:indent$}{:?}", "", node.kind, indent = depth * 2)
                } else {
                    writeln!(
                        f,
                        "{:indent$}{:?} '{}'",
                        "",
                        node.kind,
                        node.value,
                        indent = depth * 2
                    )
                };
            }
        });
        result
    }
}

/// The analyzer's result for one file: a Root node plus every error found.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseTree {
    pub root: ParseNode,
    pub errors: Vec<ParseError>,
}

impl ParseTree {
    pub fn new() -> Self {
        ParseTree {
            root: ParseNode::root(),
            errors: Vec::new(),
        }
    }

    /// Top-level statements, in source order.
    pub fn statements(&self) -> &[ParseNode] {
        &self.root.children
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Trees compare by their nodes only. Diagnostics are not part of tree
/// equality: compare `errors` separately when they matter.
impl PartialEq for ParseTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}
