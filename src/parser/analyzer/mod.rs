//! Statement-driven syntax analyzer.
//!
//! The top-level loop classifies the first token of each statement and hands
//! the cursor to the matching statement analyzer. Analyzers never abort the
//! parse: a malformed statement is recorded as a [`ParseError`], its line is
//! burned and the loop moves on.

pub mod comment;
pub mod enumeration;
pub mod message;
pub mod service;
pub mod statements;

use tracing::debug;

use super::ast::{NodeKind, ParseNode, ParseTree};
use super::cursor::TokenCursor;
use super::grammar::{self, TopLevelStatement};
use super::lexer::Token;
use crate::error::ParseError;

/// What a statement analyzer hands back: at most one node plus any errors.
/// A node can come with errors when nested members were skipped.
#[derive(Debug, Default)]
pub struct Analysis {
    pub node: Option<ParseNode>,
    pub errors: Vec<ParseError>,
}

impl Analysis {
    pub fn node(node: ParseNode) -> Self {
        Analysis {
            node: Some(node),
            errors: Vec::new(),
        }
    }

    pub fn error(error: ParseError) -> Self {
        Analysis {
            node: None,
            errors: vec![error],
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(ParseError::is_fatal)
    }
}

/// Analyze a whole token buffer into a parse tree.
pub fn analyze_tokens(tokens: &[Token]) -> ParseTree {
    let mut cursor = TokenCursor::new(tokens);
    let mut tree = ParseTree::new();

    loop {
        cursor.dump_end_of_lines();
        let Some(token) = cursor.peek() else {
            break;
        };

        if !token.is_identifier_class() {
            let err = ParseError::syntax("invalid top-level statement", token);
            tree.errors.extend(reject(&mut cursor, err).errors);
            continue;
        }

        let statement = grammar::classify_top_level(&token.lexeme);
        debug!(
            ?statement,
            line = token.line,
            block = grammar::is_block_statement(&token.lexeme),
            "analyzing top-level statement"
        );

        let analysis = match statement {
            TopLevelStatement::Syntax => statements::analyze_syntax(&mut cursor),
            TopLevelStatement::Import => statements::analyze_import(&mut cursor),
            TopLevelStatement::Package => statements::analyze_package(&mut cursor),
            TopLevelStatement::Option => statements::analyze_option(&mut cursor),
            TopLevelStatement::Message => message::analyze_message(&mut cursor),
            TopLevelStatement::Enum => enumeration::analyze_enum(&mut cursor),
            TopLevelStatement::Service => service::analyze_service(&mut cursor),
            TopLevelStatement::LineComment => comment::analyze_line_comment(&mut cursor),
            TopLevelStatement::BlockComment => comment::analyze_block_comment(&mut cursor),
            TopLevelStatement::NotFound => reject(
                &mut cursor,
                ParseError::syntax(
                    format!("unknown top-level statement '{}'", token.lexeme),
                    token,
                ),
            ),
        };

        if let Some(node) = analysis.node {
            tree.root.add_child(node);
        }
        tree.errors.extend(analysis.errors);
    }

    debug!(
        statements = tree.root.children.len(),
        errors = tree.errors.len(),
        "analysis finished"
    );
    tree
}

/// Record a failed statement. Recoverable errors burn the rest of the line.
pub(crate) fn reject(cursor: &mut TokenCursor, error: ParseError) -> Analysis {
    debug!(%error, fatal = error.is_fatal(), "statement rejected");
    if !error.is_fatal() {
        cursor.burn_line();
    }
    Analysis::error(error)
}

/// Turn a single-statement parse result into an [`Analysis`].
pub(crate) fn recover(cursor: &mut TokenCursor, result: Result<ParseNode, ParseError>) -> Analysis {
    match result {
        Ok(node) => Analysis::node(node),
        Err(error) => reject(cursor, error),
    }
}

/// Consume the next token if it satisfies `pred`; otherwise leave it in place
/// and describe what was expected.
pub(crate) fn expect<'a>(
    cursor: &mut TokenCursor<'a>,
    pred: impl FnOnce(&Token) -> bool,
    what: &str,
) -> Result<&'a Token, ParseError> {
    cursor
        .advance_if(pred)
        .ok_or_else(|| unexpected(cursor, what))
}

/// Describe why the token at the cursor is not the expected `what`.
pub(crate) fn unexpected(cursor: &TokenCursor, what: &str) -> ParseError {
    match cursor.peek() {
        Some(token) if token.is_end_of_line() => {
            ParseError::syntax(format!("expected {what} before end of line"), token)
        }
        Some(token) => ParseError::syntax(
            format!("expected {what}, found '{}'", token.lexeme),
            token,
        ),
        None => ParseError::syntax(
            format!("expected {what}, found end of input"),
            &cursor.current_or_last(),
        ),
    }
}

pub(crate) fn expect_lexeme<'a>(
    cursor: &mut TokenCursor<'a>,
    lexeme: &str,
) -> Result<&'a Token, ParseError> {
    expect(cursor, |t| t.lexeme == lexeme, &format!("'{lexeme}'"))
}

pub(crate) fn expect_terminator<'a>(cursor: &mut TokenCursor<'a>) -> Result<&'a Token, ParseError> {
    expect(cursor, |t| grammar::is_terminator(&t.lexeme), "';'")
}

pub(crate) fn expect_identifier<'a>(
    cursor: &mut TokenCursor<'a>,
    what: &str,
) -> Result<&'a Token, ParseError> {
    expect(
        cursor,
        |t| t.is_identifier_class() && grammar::is_identifier(&t.lexeme),
        what,
    )
}

/// Expect a quoted literal and return its text with quotes removed and
/// escapes decoded.
pub(crate) fn expect_quoted<'a>(
    cursor: &mut TokenCursor<'a>,
    what: &str,
) -> Result<(&'a Token, String), ParseError> {
    let token = expect(cursor, |t| grammar::is_quoted(&t.lexeme), what)?;
    let text = grammar::unquote(&token.lexeme).unwrap_or_default();
    Ok((token, grammar::unescape(text).into_owned()))
}

/// Expect an integer literal and return its value.
pub(crate) fn expect_integer<'a>(
    cursor: &mut TokenCursor<'a>,
    what: &str,
) -> Result<(&'a Token, i64), ParseError> {
    let token = expect(cursor, |t| grammar::parse_integer(&t.lexeme).is_some(), what)?;
    let value = grammar::parse_integer(&token.lexeme).unwrap_or_default();
    Ok((token, value))
}

/// Parse `keyword Name {` and return the statement node (carrying its name)
/// and the opening brace.
pub(crate) fn parse_block_header<'a>(
    cursor: &mut TokenCursor<'a>,
    kind: NodeKind,
) -> Result<(ParseNode, &'a Token), ParseError> {
    let keyword = cursor
        .advance()
        .ok_or_else(|| ParseError::syntax("expected statement", &cursor.current_or_last()))?;
    let name = expect_identifier(cursor, &format!("{} name", keyword.lexeme))?;
    let open = expect(cursor, |t| grammar::is_open_brace(&t.lexeme), "'{'")?;
    let node = ParseNode::new(kind, keyword.lexeme.as_str())
        .with_child(ParseNode::new(NodeKind::Identifier, name.lexeme.as_str()));
    Ok((node, open))
}

/// The members of a `{ }` block that was closed.
#[derive(Debug, Default)]
pub(crate) struct Body {
    pub children: Vec<ParseNode>,
    pub errors: Vec<ParseError>,
}

/// Analyze block members until the matching `}`.
///
/// Each member is dispatched through `member`, which sees the member's first
/// token. Running out of tokens before the `}` is fatal; a fatal error from a
/// member is passed up unchanged.
pub(crate) fn analyze_body<'a>(
    cursor: &mut TokenCursor<'a>,
    open: &Token,
    construct: &str,
    mut member: impl FnMut(&mut TokenCursor<'a>, &'a Token) -> Analysis,
) -> Result<Body, Vec<ParseError>> {
    let mut body = Body::default();

    loop {
        cursor.dump_end_of_lines();
        let Some(token) = cursor.peek() else {
            body.errors.push(ParseError::fatal(
                format!("unterminated {construct} body"),
                open,
            ));
            return Err(body.errors);
        };

        if grammar::is_close_brace(&token.lexeme) {
            cursor.advance();
            return Ok(body);
        }

        let analysis = member(cursor, token);
        let fatal = analysis.is_fatal();
        body.children.extend(analysis.node);
        body.errors.extend(analysis.errors);
        if fatal {
            return Err(body.errors);
        }
    }
}
