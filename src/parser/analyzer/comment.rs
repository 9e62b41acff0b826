//! `//` and `/* */` comments.

use super::{reject, Analysis};
use crate::error::ParseError;
use crate::parser::ast::{NodeKind, ParseNode};
use crate::parser::cursor::TokenCursor;
use crate::parser::grammar;

/// A line comment runs to the end of its line. The line break itself is
/// left for the caller.
pub fn analyze_line_comment(cursor: &mut TokenCursor) -> Analysis {
    let Some(open) = cursor.advance_if(|t| grammar::is_line_comment(&t.lexeme)) else {
        let error = ParseError::syntax("expected '//'", &cursor.current_or_last());
        return reject(cursor, error);
    };

    let mut words = Vec::new();
    let glued = &open.lexeme[2..];
    if !glued.is_empty() {
        words.push(glued);
    }
    while let Some(token) = cursor.advance_if(|t| !t.is_end_of_line()) {
        words.push(token.lexeme.as_str());
    }

    Analysis::node(
        ParseNode::new(NodeKind::Comment, "//")
            .with_child(ParseNode::new(NodeKind::CommentText, words.join(" "))),
    )
}

/// A block comment runs to the first token ending in `*/`, across lines.
/// Running out of tokens first is fatal: there is no safe place to resume.
pub fn analyze_block_comment(cursor: &mut TokenCursor) -> Analysis {
    let Some(open) = cursor.advance_if(|t| grammar::is_block_comment_open(&t.lexeme)) else {
        let error = ParseError::syntax("expected '/*'", &cursor.current_or_last());
        return reject(cursor, error);
    };

    let mut text = open.lexeme.clone();
    let mut closed = open.lexeme.len() >= 4 && grammar::is_block_comment_close(&open.lexeme);

    while !closed {
        let Some(token) = cursor.advance() else {
            return reject(cursor, ParseError::fatal("unterminated block comment", open));
        };
        if token.is_end_of_line() {
            text.push('\n');
            continue;
        }
        if !text.ends_with('\n') {
            text.push(' ');
        }
        text.push_str(&token.lexeme);
        closed = grammar::is_block_comment_close(&token.lexeme);
    }

    let inner = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(&text)
        .trim();

    Analysis::node(
        ParseNode::new(NodeKind::Comment, "/*")
            .with_child(ParseNode::new(NodeKind::CommentText, inner)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn comment_text(analysis: &Analysis) -> &str {
        let node = analysis.node.as_ref().unwrap();
        &node.child(NodeKind::CommentText).unwrap().value
    }

    #[test]
    fn test_line_comment() {
        let tokens = tokenize("// Level 2; nested\nmessage");
        let mut cursor = TokenCursor::new(&tokens);
        let analysis = analyze_line_comment(&mut cursor);
        assert_eq!(comment_text(&analysis), "Level 2 ; nested");
        assert!(cursor.peek().unwrap().is_end_of_line());
    }

    #[test]
    fn test_line_comment_glued_text() {
        let tokens = tokenize("//TODO later");
        let mut cursor = TokenCursor::new(&tokens);
        let analysis = analyze_line_comment(&mut cursor);
        assert_eq!(comment_text(&analysis), "TODO later");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_block_comment_multiline() {
        let tokens = tokenize("/* first line\n   second line */\nmessage");
        let mut cursor = TokenCursor::new(&tokens);
        let analysis = analyze_block_comment(&mut cursor);
        assert!(analysis.errors.is_empty());
        assert_eq!(comment_text(&analysis), "first line\nsecond line");
        assert!(cursor.peek().unwrap().is_end_of_line());
    }

    #[test]
    fn test_block_comment_single_token() {
        let tokens = tokenize("/**/ package");
        let mut cursor = TokenCursor::new(&tokens);
        let analysis = analyze_block_comment(&mut cursor);
        assert_eq!(comment_text(&analysis), "");
        assert_eq!(cursor.peek().unwrap().lexeme, "package");
    }

    #[test]
    fn test_unterminated_block_comment_is_fatal() {
        let tokens = tokenize("/* never\nclosed");
        let mut cursor = TokenCursor::new(&tokens);
        let analysis = analyze_block_comment(&mut cursor);
        assert!(analysis.node.is_none());
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].is_fatal());
        assert_eq!(analysis.errors[0].token.lexeme, "/*");
    }
}
