//! `service` blocks and their `rpc` methods.

use super::statements::analyze_option;
use super::{
    analyze_body, comment, expect, expect_identifier, parse_block_header, reject, Analysis,
};
use crate::error::ParseError;
use crate::parser::ast::{NodeKind, ParseNode};
use crate::parser::cursor::TokenCursor;
use crate::parser::grammar::{self, ServiceStatement};
use crate::parser::lexer::Token;

/// `service Name { rpc ...; option ...; }`
pub fn analyze_service(cursor: &mut TokenCursor) -> Analysis {
    let (mut node, open) = match parse_block_header(cursor, NodeKind::Service) {
        Ok(header) => header,
        Err(error) => return reject(cursor, error),
    };

    match analyze_body(cursor, open, "service", analyze_member) {
        Ok(body) => {
            node.children.extend(body.children);
            Analysis {
                node: Some(node),
                errors: body.errors,
            }
        }
        Err(errors) => Analysis { node: None, errors },
    }
}

fn analyze_member(cursor: &mut TokenCursor, token: &Token) -> Analysis {
    match grammar::classify_service_member(&token.lexeme) {
        ServiceStatement::Method => analyze_method(cursor),
        ServiceStatement::Option => analyze_option(cursor),
        ServiceStatement::LineComment => comment::analyze_line_comment(cursor),
        ServiceStatement::BlockComment => comment::analyze_block_comment(cursor),
        ServiceStatement::NotFound => reject(
            cursor,
            ParseError::syntax(format!("unknown service member '{}'", token.lexeme), token),
        ),
    }
}

/// `rpc Name ([stream] In) returns ([stream] Out) (; | { option* })`
fn analyze_method(cursor: &mut TokenCursor) -> Analysis {
    let mut node = match parse_signature(cursor) {
        Ok(node) => node,
        Err(error) => return reject(cursor, error),
    };

    if cursor.advance_if(|t| grammar::is_terminator(&t.lexeme)).is_some() {
        return Analysis::node(node);
    }

    let open = match expect(cursor, |t| grammar::is_open_brace(&t.lexeme), "';' or '{'") {
        Ok(open) => open,
        Err(error) => return reject(cursor, error),
    };
    match analyze_body(cursor, open, "rpc", analyze_method_member) {
        Ok(body) => {
            cursor.advance_if(|t| grammar::is_terminator(&t.lexeme));
            node.children.extend(body.children);
            Analysis {
                node: Some(node),
                errors: body.errors,
            }
        }
        Err(errors) => Analysis { node: None, errors },
    }
}

fn analyze_method_member(cursor: &mut TokenCursor, token: &Token) -> Analysis {
    match grammar::classify_service_member(&token.lexeme) {
        ServiceStatement::Option => analyze_option(cursor),
        ServiceStatement::LineComment => comment::analyze_line_comment(cursor),
        ServiceStatement::BlockComment => comment::analyze_block_comment(cursor),
        ServiceStatement::Method | ServiceStatement::NotFound => reject(
            cursor,
            ParseError::syntax(format!("unknown rpc member '{}'", token.lexeme), token),
        ),
    }
}

fn parse_signature(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let keyword = expect(cursor, |t| t.lexeme == "rpc", "'rpc'")?;
    let name = expect_identifier(cursor, "rpc name")?;
    let input = parse_message_type(cursor, NodeKind::MethodInput)?;
    expect(cursor, |t| t.lexeme == "returns", "'returns'")?;
    let output = parse_message_type(cursor, NodeKind::MethodOutput)?;

    Ok(ParseNode::new(NodeKind::ServiceMethod, keyword.lexeme.as_str())
        .with_child(ParseNode::new(NodeKind::Identifier, name.lexeme.as_str()))
        .with_child(input)
        .with_child(output))
}

/// `( [stream] Type )`
fn parse_message_type(cursor: &mut TokenCursor, kind: NodeKind) -> Result<ParseNode, ParseError> {
    expect(cursor, |t| grammar::is_open_paren(&t.lexeme), "'('")?;

    // `stream` is only a modifier when a type name follows it
    let streaming = cursor.peek().is_some_and(|t| t.lexeme == "stream")
        && cursor
            .peek_nth(1)
            .is_some_and(|t| !grammar::is_close_paren(&t.lexeme));
    let stream = if streaming { cursor.advance() } else { None };

    let message_type = expect(
        cursor,
        |t| t.is_identifier_class() && grammar::is_type_reference(&t.lexeme),
        "message type",
    )?;
    expect(cursor, |t| grammar::is_close_paren(&t.lexeme), "')'")?;

    let mut node = ParseNode::new(kind, message_type.lexeme.as_str());
    if let Some(stream) = stream {
        node.add_child(ParseNode::new(NodeKind::Stream, stream.lexeme.as_str()));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn analyze(source: &str) -> Analysis {
        let tokens = tokenize(source);
        let mut cursor = TokenCursor::new(&tokens);
        analyze_service(&mut cursor)
    }

    #[test]
    fn test_service_methods() {
        let analysis = analyze(
            "service RouteGuide {
  rpc GetFeature(Point) returns (Feature);
  rpc RouteChat(stream RouteNote) returns (stream RouteNote) {}
  rpc ListFeatures(Rectangle) returns (stream Feature) {
    option deprecated = true;
  }
}",
        );
        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
        let node = analysis.node.unwrap();
        assert_eq!(node.child(NodeKind::Identifier).unwrap().value, "RouteGuide");

        let methods: Vec<_> = node.children_of(NodeKind::ServiceMethod).collect();
        assert_eq!(methods.len(), 3);

        let get = methods[0];
        assert_eq!(get.child(NodeKind::Identifier).unwrap().value, "GetFeature");
        let input = get.child(NodeKind::MethodInput).unwrap();
        assert_eq!(input.value, "Point");
        assert!(!input.has_child(NodeKind::Stream));

        let chat = methods[1];
        assert!(chat.child(NodeKind::MethodInput).unwrap().has_child(NodeKind::Stream));
        assert!(chat.child(NodeKind::MethodOutput).unwrap().has_child(NodeKind::Stream));

        let list = methods[2];
        assert!(list.has_child(NodeKind::Option));
    }

    #[test]
    fn test_type_named_stream() {
        let analysis = analyze("service S {\n  rpc Get(stream) returns (Reply);\n}");
        assert!(analysis.errors.is_empty());
        let node = analysis.node.unwrap();
        let input = node
            .child(NodeKind::ServiceMethod)
            .unwrap()
            .child(NodeKind::MethodInput)
            .unwrap();
        assert_eq!(input.value, "stream");
        assert!(!input.has_child(NodeKind::Stream));
    }

    #[test]
    fn test_bad_method_is_skipped() {
        let analysis = analyze(
            "service S {
  rpc Broken(Request) Reply;
  rpc Ok(Request) returns (Reply);
}",
        );
        assert_eq!(analysis.errors.len(), 1);
        assert_eq!(analysis.errors[0].message, "expected 'returns', found 'Reply'");
        let node = analysis.node.unwrap();
        assert_eq!(node.children_of(NodeKind::ServiceMethod).count(), 1);
    }

    #[test]
    fn test_service_option_and_comment() {
        let analysis = analyze(
            "service S {
  // health checks
  option (api.version) = \"v2\";
}",
        );
        assert!(analysis.errors.is_empty());
        let node = analysis.node.unwrap();
        assert!(node.has_child(NodeKind::Comment));
        assert!(node.has_child(NodeKind::Option));
    }

    #[test]
    fn test_unknown_service_member() {
        let analysis = analyze("service S {\n  int32 x = 1;\n}");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.node.is_some());
    }
}
