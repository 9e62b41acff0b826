//! `enum` blocks.

use super::statements::{analyze_option, analyze_reserved, parse_option_list, ReservedScope};
use super::{
    analyze_body, comment, expect, expect_identifier, expect_integer, expect_terminator,
    parse_block_header, recover, reject, Analysis,
};
use crate::error::ParseError;
use crate::parser::ast::{NodeKind, ParseNode};
use crate::parser::cursor::TokenCursor;
use crate::parser::grammar::{self, EnumStatement};
use crate::parser::lexer::Token;

/// `enum Name { CONSTANT = number [options]; ... }`
pub fn analyze_enum(cursor: &mut TokenCursor) -> Analysis {
    let (mut node, open) = match parse_block_header(cursor, NodeKind::Enum) {
        Ok(header) => header,
        Err(error) => return reject(cursor, error),
    };

    match analyze_body(cursor, open, "enum", analyze_member) {
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
    match grammar::classify_enum_member(&token.lexeme) {
        EnumStatement::Constant => {
            let result = parse_constant(cursor);
            recover(cursor, result)
        }
        EnumStatement::Option => analyze_option(cursor),
        EnumStatement::Reserved => analyze_reserved(cursor, ReservedScope::Enum),
        EnumStatement::LineComment => comment::analyze_line_comment(cursor),
        EnumStatement::BlockComment => comment::analyze_block_comment(cursor),
        EnumStatement::NotFound => reject(
            cursor,
            ParseError::syntax(format!("unknown enum member '{}'", token.lexeme), token),
        ),
    }
}

fn parse_constant(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let name = expect_identifier(cursor, "enum constant name")?;
    expect(cursor, |t| grammar::is_assignment(&t.lexeme), "'='")?;
    let (number, value) = expect_integer(cursor, "enum value")?;
    if i32::try_from(value).is_err() {
        return Err(ParseError::syntax(
            format!("enum value {value} is out of range"),
            number,
        ));
    }

    let mut node = ParseNode::new(NodeKind::EnumConstant, "")
        .with_child(ParseNode::new(NodeKind::Identifier, name.lexeme.as_str()))
        .with_child(ParseNode::new(NodeKind::FieldNumber, number.lexeme.as_str()));
    node.children.extend(parse_option_list(cursor)?);
    expect_terminator(cursor)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn analyze(source: &str) -> Analysis {
        let tokens = tokenize(source);
        let mut cursor = TokenCursor::new(&tokens);
        analyze_enum(&mut cursor)
    }

    #[test]
    fn test_enum_constants() {
        let analysis = analyze(
            "enum Corpus {
  CORPUS_UNSPECIFIED = 0;
  CORPUS_WEB = 1;
  CORPUS_NEGATIVE = -1 [deprecated = true];
}",
        );
        assert!(analysis.errors.is_empty());
        let node = analysis.node.unwrap();
        assert_eq!(node.child(NodeKind::Identifier).unwrap().value, "Corpus");

        let constants: Vec<_> = node.children_of(NodeKind::EnumConstant).collect();
        assert_eq!(constants.len(), 3);
        assert_eq!(constants[2].child(NodeKind::FieldNumber).unwrap().value, "-1");
        assert!(constants[2].has_child(NodeKind::Option));
    }

    #[test]
    fn test_enum_options_and_reserved() {
        let analysis = analyze(
            "enum E {
  option allow_alias = true;
  reserved 2, 15 to max;
  A = 0;
  B = 0;
}",
        );
        assert!(analysis.errors.is_empty());
        let node = analysis.node.unwrap();
        assert!(node.has_child(NodeKind::Option));
        assert!(node.has_child(NodeKind::Reserved));
        assert_eq!(node.children_of(NodeKind::EnumConstant).count(), 2);
    }

    #[test]
    fn test_bad_constant_is_skipped() {
        let analysis = analyze("enum E {\n  A = zero;\n  B = 1;\n}");
        assert_eq!(analysis.errors.len(), 1);
        assert_eq!(analysis.errors[0].token.lexeme, "zero");
        let node = analysis.node.unwrap();
        assert_eq!(node.children_of(NodeKind::EnumConstant).count(), 1);
    }

    #[test]
    fn test_out_of_range_value() {
        let analysis = analyze("enum E {\n  A = 4294967296;\n}");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("out of range"));
    }

    #[test]
    fn test_unterminated_enum() {
        let analysis = analyze("enum E {\n  A = 0;");
        assert!(analysis.node.is_none());
        assert!(analysis.errors[0].is_fatal());
    }

    #[test]
    fn test_single_line_enum() {
        let analysis = analyze("enum Kind { A = 0; B = 1; }");
        assert!(analysis.errors.is_empty());
        assert_eq!(
            analysis.node.unwrap().children_of(NodeKind::EnumConstant).count(),
            2
        );
    }
}
