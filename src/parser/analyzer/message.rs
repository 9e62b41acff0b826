//! `message` blocks and their members: fields, maps and oneofs.

use tracing::debug;

use super::statements::{analyze_option, analyze_reserved, parse_option_list, ReservedScope};
use super::{
    analyze_body, comment, enumeration, expect, expect_identifier, expect_terminator,
    parse_block_header, recover, reject, unexpected, Analysis,
};
use crate::error::ParseError;
use crate::parser::ast::{NodeKind, ParseNode};
use crate::parser::cursor::TokenCursor;
use crate::parser::grammar::{self, MessageStatement, OneOfStatement};
use crate::parser::lexer::Token;

/// `message Name { ... }`
///
/// Members that fail are recorded and skipped; the message node is still
/// produced. An unterminated body yields no node.
pub fn analyze_message(cursor: &mut TokenCursor) -> Analysis {
    let (mut node, open) = match parse_block_header(cursor, NodeKind::Message) {
        Ok(header) => header,
        Err(error) => return reject(cursor, error),
    };

    match analyze_body(cursor, open, "message", analyze_member) {
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
    let statement = grammar::classify_message_member(&token.lexeme);
    debug!(?statement, line = token.line, "analyzing message member");

    match statement {
        MessageStatement::Field => {
            let result = parse_field(cursor, true);
            recover(cursor, result)
        }
        MessageStatement::Map => {
            let result = parse_map(cursor);
            recover(cursor, result)
        }
        MessageStatement::Message => analyze_message(cursor),
        MessageStatement::Enum => enumeration::analyze_enum(cursor),
        MessageStatement::Reserved => analyze_reserved(cursor, ReservedScope::Message),
        MessageStatement::OneOf => analyze_oneof(cursor),
        MessageStatement::Option => analyze_option(cursor),
        MessageStatement::LineComment => comment::analyze_line_comment(cursor),
        MessageStatement::BlockComment => comment::analyze_block_comment(cursor),
        MessageStatement::NotFound => reject(
            cursor,
            ParseError::syntax(
                format!("unknown message member '{}'", token.lexeme),
                token,
            ),
        ),
    }
}

/// `[repeated|optional] type name = number [options];`
///
/// Labels are only accepted when `labels` is set (not inside oneofs).
pub(crate) fn parse_field(cursor: &mut TokenCursor, labels: bool) -> Result<ParseNode, ParseError> {
    let mut node = ParseNode::new(NodeKind::Field, "");

    if labels {
        if let Some(label) = cursor.advance_if(|t| t.lexeme == "repeated") {
            node.add_child(ParseNode::new(NodeKind::Repeated, label.lexeme.as_str()));
        } else if let Some(label) = cursor.advance_if(|t| t.lexeme == "optional") {
            node.add_child(ParseNode::new(NodeKind::Optional, label.lexeme.as_str()));
        }
    }

    let field_type = expect(cursor, is_type_token, "field type")?;
    let kind = if grammar::is_scalar_type(&field_type.lexeme) {
        NodeKind::Type
    } else {
        NodeKind::UserType
    };
    node.add_child(ParseNode::new(kind, field_type.lexeme.as_str()));

    finish_field(cursor, node)
}

/// `map<Key, Value> name = number [options];`
pub(crate) fn parse_map(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let keyword = expect(cursor, |t| t.lexeme == "map", "'map'")?;
    let mut node = ParseNode::new(NodeKind::Map, keyword.lexeme.as_str());

    expect(cursor, |t| t.lexeme == "<", "'<'")?;
    let key = expect(
        cursor,
        |t| grammar::is_map_key_type(&t.lexeme),
        "map key type (integral, bool or string)",
    )?;
    node.add_child(ParseNode::new(NodeKind::MapKey, key.lexeme.as_str()));

    expect(cursor, |t| grammar::is_separator(&t.lexeme), "','")?;
    let value = expect(cursor, is_type_token, "map value type")?;
    node.add_child(ParseNode::new(NodeKind::MapValue, value.lexeme.as_str()));
    expect(cursor, |t| t.lexeme == ">", "'>'")?;

    finish_field(cursor, node)
}

/// The `name = number [options];` tail shared by fields and maps.
fn finish_field(cursor: &mut TokenCursor, mut node: ParseNode) -> Result<ParseNode, ParseError> {
    let name = expect_identifier(cursor, "field name")?;
    node.add_child(ParseNode::new(NodeKind::Identifier, name.lexeme.as_str()));

    expect(cursor, |t| grammar::is_assignment(&t.lexeme), "'='")?;
    let number = expect(cursor, is_field_number, "field number")?;
    node.add_child(ParseNode::new(NodeKind::FieldNumber, number.lexeme.as_str()));

    node.children.extend(parse_option_list(cursor)?);
    expect_terminator(cursor)?;
    Ok(node)
}

fn is_type_token(token: &Token) -> bool {
    token.is_identifier_class()
        && !grammar::is_keyword(&token.lexeme)
        && (grammar::is_scalar_type(&token.lexeme) || grammar::is_type_reference(&token.lexeme))
}

fn is_field_number(token: &Token) -> bool {
    grammar::parse_integer(&token.lexeme)
        .is_some_and(|n| (1..=grammar::MAX_FIELD_NUMBER).contains(&n))
}

/// `oneof name { field* }`
pub fn analyze_oneof(cursor: &mut TokenCursor) -> Analysis {
    let (mut node, open) = match parse_block_header(cursor, NodeKind::OneOf) {
        Ok(header) => header,
        Err(error) => return reject(cursor, error),
    };

    match analyze_body(cursor, open, "oneof", analyze_oneof_member) {
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

fn analyze_oneof_member(cursor: &mut TokenCursor, token: &Token) -> Analysis {
    match grammar::classify_oneof_member(&token.lexeme) {
        OneOfStatement::Field => {
            let result = parse_field(cursor, false);
            recover(cursor, result)
        }
        OneOfStatement::Option => analyze_option(cursor),
        OneOfStatement::LineComment => comment::analyze_line_comment(cursor),
        OneOfStatement::BlockComment => comment::analyze_block_comment(cursor),
        OneOfStatement::NotFound => {
            let error = unexpected(cursor, "oneof field");
            reject(cursor, error)
        }
    }
}
