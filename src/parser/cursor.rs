//! Index-based cursor over an owned token buffer.

use super::lexer::{Token, TokenKind};

/// A read position in a token slice.
///
/// Analyzers share one cursor by `&mut`, so whatever a nested analyzer
/// consumes is consumed for its caller too. The position can be read and
/// restored, which makes it cheap to replay the same tokens.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        TokenCursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Peek `n` tokens ahead of the next one.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    /// Peek past any line breaks.
    pub fn peek_significant(&self) -> Option<&'a Token> {
        self.tokens[self.pos..].iter().find(|t| !t.is_end_of_line())
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it satisfies `pred`.
    pub fn advance_if(&mut self, pred: impl FnOnce(&Token) -> bool) -> Option<&'a Token> {
        let token = self.peek().filter(|t| pred(t))?;
        self.pos += 1;
        Some(token)
    }

    /// The token an error at the current position should point at: the next
    /// token, or the last one when the buffer is exhausted.
    pub fn current_or_last(&self) -> Token {
        self.peek()
            .or_else(|| self.tokens.last())
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::EndOfLine, 1, 0, "\n"))
    }

    /// Discard tokens up to and including the next end of line.
    /// Returns how many tokens were discarded.
    pub fn burn_line(&mut self) -> usize {
        let start = self.pos;
        while let Some(token) = self.advance() {
            if token.is_end_of_line() {
                break;
            }
        }
        let burned = self.pos - start;
        tracing::trace!(burned, position = self.pos, "burned line");
        burned
    }

    /// Consume any run of end-of-line tokens.
    pub fn dump_end_of_lines(&mut self) {
        while self.advance_if(Token::is_end_of_line).is_some() {}
    }
}
