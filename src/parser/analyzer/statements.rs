//! Single-line statements: `syntax`, `import`, `package`, `option` and
//! `reserved`, plus the option lists shared by fields and enum constants.

use std::ops::RangeInclusive;

use super::{
    expect, expect_integer, expect_lexeme, expect_quoted, expect_terminator, recover, unexpected,
    Analysis,
};
use crate::error::ParseError;
use crate::parser::ast::{NodeKind, ParseNode};
use crate::parser::cursor::TokenCursor;
use crate::parser::grammar;
use crate::parser::lexer::{Token, TokenKind};
use crate::types::Syntax;

/// `syntax = "proto3";`
pub fn analyze_syntax(cursor: &mut TokenCursor) -> Analysis {
    let result = parse_syntax(cursor);
    recover(cursor, result)
}

fn parse_syntax(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let keyword = expect_lexeme(cursor, "syntax")?;
    expect(cursor, |t| grammar::is_assignment(&t.lexeme), "'='")?;
    let (token, version) = expect_quoted(cursor, "quoted syntax identifier")?;
    if Syntax::from_name(&version).is_none() {
        return Err(ParseError::syntax(
            format!("unrecognized syntax identifier '{version}'"),
            token,
        ));
    }
    expect_terminator(cursor)?;

    Ok(ParseNode::new(NodeKind::Syntax, keyword.lexeme.as_str())
        .with_child(ParseNode::new(NodeKind::StringLiteral, version)))
}

/// `import [weak|public] "path";`
pub fn analyze_import(cursor: &mut TokenCursor) -> Analysis {
    let result = parse_import(cursor);
    recover(cursor, result)
}

fn parse_import(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let keyword = expect_lexeme(cursor, "import")?;
    let mut node = ParseNode::new(NodeKind::Import, keyword.lexeme.as_str());

    if let Some(modifier) = cursor.advance_if(|t| matches!(t.lexeme.as_str(), "weak" | "public")) {
        node.add_child(ParseNode::new(NodeKind::ImportModifier, modifier.lexeme.as_str()));
    }
    let (_, path) = expect_quoted(cursor, "quoted import path")?;
    node.add_child(ParseNode::new(NodeKind::StringLiteral, path));
    expect_terminator(cursor)?;

    Ok(node)
}

/// `package foo.bar;`
pub fn analyze_package(cursor: &mut TokenCursor) -> Analysis {
    let result = parse_package(cursor);
    recover(cursor, result)
}

fn parse_package(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    let keyword = expect_lexeme(cursor, "package")?;
    let name = expect(
        cursor,
        |t| t.is_identifier_class() && grammar::is_full_identifier(&t.lexeme),
        "package name",
    )?;
    expect_terminator(cursor)?;

    Ok(ParseNode::new(NodeKind::Package, keyword.lexeme.as_str())
        .with_child(ParseNode::new(NodeKind::Identifier, name.lexeme.as_str())))
}

/// `option name = constant;` at any level.
pub fn analyze_option(cursor: &mut TokenCursor) -> Analysis {
    let result = parse_option_statement(cursor);
    recover(cursor, result)
}

fn parse_option_statement(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    expect_lexeme(cursor, "option")?;
    let node = parse_option_assignment(cursor, false)?;
    expect_terminator(cursor)?;
    Ok(node)
}

/// `name = constant`, the part an option statement shares with a bracketed
/// option list. Inside brackets line breaks are skipped.
fn parse_option_assignment(
    cursor: &mut TokenCursor,
    multiline: bool,
) -> Result<ParseNode, ParseError> {
    skip_line_breaks(cursor, multiline);
    let name = parse_option_name(cursor)?;
    skip_line_breaks(cursor, multiline);
    expect(cursor, |t| grammar::is_assignment(&t.lexeme), "'='")?;
    skip_line_breaks(cursor, multiline);
    let value = parse_constant(cursor)?;

    Ok(ParseNode::new(NodeKind::Option, "option")
        .with_child(ParseNode::new(NodeKind::Identifier, name))
        .with_child(ParseNode::new(NodeKind::OptionValue, value)))
}

fn skip_line_breaks(cursor: &mut TokenCursor, enabled: bool) {
    if enabled {
        cursor.dump_end_of_lines();
    }
}

/// An option name: `java_package`, `a.b`, or a custom `(my.ext).field`.
fn parse_option_name(cursor: &mut TokenCursor) -> Result<String, ParseError> {
    if cursor.advance_if(|t| grammar::is_open_paren(&t.lexeme)).is_none() {
        let name = expect(
            cursor,
            |t| t.is_identifier_class() && grammar::is_full_identifier(&t.lexeme),
            "option name",
        )?;
        return Ok(name.lexeme.clone());
    }

    let extension = expect(
        cursor,
        |t| t.is_identifier_class() && grammar::is_type_reference(&t.lexeme),
        "extension name",
    )?;
    expect(cursor, |t| grammar::is_close_paren(&t.lexeme), "')'")?;

    let mut name = format!("({})", extension.lexeme);
    let suffix = cursor.advance_if(|t| {
        t.lexeme
            .strip_prefix('.')
            .is_some_and(grammar::is_full_identifier)
    });
    if let Some(suffix) = suffix {
        name.push_str(&suffix.lexeme);
    }
    Ok(name)
}

/// A constant: quoted string (returned unquoted with escapes decoded),
/// number or identifier.
fn parse_constant(cursor: &mut TokenCursor) -> Result<String, ParseError> {
    let token = expect(
        cursor,
        |t| {
            grammar::is_quoted(&t.lexeme)
                || t.kind == TokenKind::Numeric
                || (t.is_identifier_class() && grammar::is_full_identifier(&t.lexeme))
        },
        "option value",
    )?;
    Ok(match grammar::unquote(&token.lexeme) {
        Some(text) => grammar::unescape(text).into_owned(),
        None => token.lexeme.clone(),
    })
}

/// An optional `[name = value, ...]` list after a field or enum constant.
pub(crate) fn parse_option_list(cursor: &mut TokenCursor) -> Result<Vec<ParseNode>, ParseError> {
    if cursor
        .advance_if(|t| grammar::is_open_bracket(&t.lexeme))
        .is_none()
    {
        return Ok(Vec::new());
    }

    let mut options = Vec::new();
    loop {
        options.push(parse_option_assignment(cursor, true)?);
        cursor.dump_end_of_lines();
        let token = expect(
            cursor,
            |t| grammar::is_separator(&t.lexeme) || grammar::is_close_bracket(&t.lexeme),
            "',' or ']'",
        )?;
        if grammar::is_close_bracket(&token.lexeme) {
            return Ok(options);
        }
    }
}

/// `reserved "a", "b";` or `reserved 2, 9 to 11, 40 to max;`
///
/// The first literal picks names or numbers. A literal of the other kind
/// anywhere in the run fails the whole statement. Numbers must be valid for
/// `scope` and ranges must not be empty.
pub fn analyze_reserved(cursor: &mut TokenCursor, scope: ReservedScope) -> Analysis {
    let result = parse_reserved(cursor, scope);
    recover(cursor, result)
}

/// Where a `reserved` statement appears, which decides the valid numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedScope {
    /// Field numbers, `1..=536870911`.
    Message,
    /// Enum values, any `i32`.
    Enum,
}

impl ReservedScope {
    pub fn bounds(self) -> RangeInclusive<i64> {
        match self {
            ReservedScope::Message => 1..=grammar::MAX_FIELD_NUMBER,
            ReservedScope::Enum => i64::from(i32::MIN)..=i64::from(i32::MAX),
        }
    }
}

fn parse_reserved(cursor: &mut TokenCursor, scope: ReservedScope) -> Result<ParseNode, ParseError> {
    let keyword = expect_lexeme(cursor, "reserved")?;
    let mut node = ParseNode::new(NodeKind::Reserved, keyword.lexeme.as_str());

    let names = match cursor.peek() {
        Some(t) if grammar::is_quoted(&t.lexeme) => true,
        Some(t) if t.kind == TokenKind::Numeric => false,
        _ => return Err(unexpected(cursor, "reserved names or field numbers")),
    };

    loop {
        if names {
            node.add_child(parse_reserved_name(cursor)?);
        } else {
            node.add_child(parse_reserved_range(cursor, scope)?);
        }
        let token = expect(
            cursor,
            |t| grammar::is_separator(&t.lexeme) || grammar::is_terminator(&t.lexeme),
            "',' or ';'",
        )?;
        if grammar::is_terminator(&token.lexeme) {
            return Ok(node);
        }
    }
}

fn parse_reserved_name(cursor: &mut TokenCursor) -> Result<ParseNode, ParseError> {
    if let Some(token) = cursor.peek().filter(|t| t.kind == TokenKind::Numeric) {
        return Err(mixed_reservation(token));
    }
    let (_, name) = expect_quoted(cursor, "quoted field name")?;
    Ok(ParseNode::new(NodeKind::StringLiteral, name))
}

fn parse_reserved_range(
    cursor: &mut TokenCursor,
    scope: ReservedScope,
) -> Result<ParseNode, ParseError> {
    if let Some(token) = cursor.peek().filter(|t| grammar::is_quoted(&t.lexeme)) {
        return Err(mixed_reservation(token));
    }
    let (start, first) = expect_integer(cursor, "field number")?;
    check_reserved_number(scope, start, first)?;
    let mut range = ParseNode::new(NodeKind::Range, start.lexeme.as_str());

    if cursor.advance_if(|t| t.lexeme == "to").is_some() {
        let end = expect(
            cursor,
            |t| t.lexeme == "max" || grammar::parse_integer(&t.lexeme).is_some(),
            "range end",
        )?;
        if let Some(last) = grammar::parse_integer(&end.lexeme) {
            check_reserved_number(scope, end, last)?;
            if last < first {
                return Err(ParseError::syntax(
                    format!("reserved range {first} to {last} is empty"),
                    end,
                ));
            }
        }
        range.add_child(ParseNode::new(NodeKind::RangeEnd, end.lexeme.as_str()));
    }
    Ok(range)
}

fn check_reserved_number(
    scope: ReservedScope,
    token: &Token,
    number: i64,
) -> Result<(), ParseError> {
    if scope.bounds().contains(&number) {
        Ok(())
    } else {
        Err(ParseError::syntax(
            format!("reserved number {number} is out of range"),
            token,
        ))
    }
}

fn mixed_reservation(token: &Token) -> ParseError {
    ParseError::syntax(
        "reserved statement cannot mix field names and numbers",
        token,
    )
}
