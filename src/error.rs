use crate::parser::ast::NodeKind;
use crate::parser::lexer::Token;

/// Whether the analyzer could resynchronize after a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseErrorKind {
    /// The statement was skipped up to the end of its line; parsing went on.
    Syntax,
    /// Tokens ran out inside a construct (unterminated comment or body).
    Fatal,
}

/// A diagnostic collected while analyzing a schema file.
///
/// Parse errors are data: the analyzer records them and keeps going, so a
/// single pass reports every malformed statement in the file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{message} : @ {token}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// The offending token, carrying its line and column.
    pub token: Token,
}

impl ParseError {
    /// A recoverable error for a statement that was skipped.
    pub fn syntax(message: impl Into<String>, token: &Token) -> Self {
        ParseError {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            token: token.clone(),
        }
    }

    /// An unrecoverable error for a construct that never terminated.
    pub fn fatal(message: impl Into<String>, token: &Token) -> Self {
        ParseError {
            kind: ParseErrorKind::Fatal,
            message: message.into(),
            token: token.clone(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ParseErrorKind::Fatal
    }
}

/// Errors from the character-level source reader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("end of input reached at line {line}, column {column}")]
    EndOfInput { line: usize, column: usize },
}

/// Errors from lowering a parse tree into a descriptor.
///
/// These signal a tree the analyzer would never build, i.e. caller misuse,
/// and are kept apart from [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    #[error("descriptor can only be built from a Root node, found {found:?}")]
    NotRoot { found: NodeKind },

    #[error("{parent:?} node '{value}' has no {expected:?} child")]
    MissingChild {
        parent: NodeKind,
        value: String,
        expected: NodeKind,
    },

    #[error("invalid value '{value}' in {kind:?} node")]
    InvalidValue { kind: NodeKind, value: String },

    #[error("unexpected {found:?} node inside {parent:?}")]
    UnexpectedChild { parent: NodeKind, found: NodeKind },
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Lower(#[from] LowerError),
}

/// Result type alias for protoparse operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::TokenKind;

    #[test]
    fn test_parse_error_display() {
        let token = Token::new(TokenKind::String, 3, 7, "proto4");
        let err = ParseError::syntax("unrecognized syntax identifier", &token);
        assert_eq!(
            err.to_string(),
            "unrecognized syntax identifier : @ proto4 L3:C7"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_lower_error_display() {
        let err = LowerError::NotRoot {
            found: NodeKind::Message,
        };
        assert_eq!(
            err.to_string(),
            "descriptor can only be built from a Root node, found Message"
        );
    }
}
