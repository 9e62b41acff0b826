use std::fmt;

use super::grammar;
use super::source::SourceReader;

/// Token types produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    /// A lexeme from the keyword table (`message`, `map`, ...)
    Id,
    /// Any other text: identifiers, quoted literals, comment markers
    String,
    /// A numeric literal (decimal, octal, hex, float)
    Numeric,
    /// One of `; { } = , < > [ ] ( )`
    Control,
    /// A line break
    EndOfLine,
}

/// A classified lexeme with the position of its first character.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize, lexeme: impl Into<String>) -> Self {
        Token {
            kind,
            line,
            column,
            lexeme: lexeme.into(),
        }
    }

    /// Identifier-class tokens: keywords and plain text.
    pub fn is_identifier_class(&self) -> bool {
        matches!(self.kind, TokenKind::Id | TokenKind::String)
    }

    pub fn is_end_of_line(&self) -> bool {
        self.kind == TokenKind::EndOfLine
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.line == other.line
            && self.column == other.column
            && self.lexeme.eq_ignore_ascii_case(&other.lexeme)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = match self.kind {
            TokenKind::EndOfLine => "\\n",
            _ => self.lexeme.as_str(),
        };
        write!(f, "{} L{}:C{}", lexeme, self.line, self.column)
    }
}

/// Tokenizer for `.proto` schema text.
///
/// Characters accumulate in a pending buffer until whitespace or a control
/// character flushes it. A quote that starts a lexeme buffers the literal
/// whole, so `"a b;c"` is one lexeme. Inside comments quotes are plain text.
pub struct Lexer<'a> {
    reader: SourceReader<'a>,
    buffer: String,
    start: (usize, usize),
    quote: Option<char>,
    escaped: bool,
    comment: Option<CommentState>,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentState {
    /// Until the end of the line.
    Line,
    /// Until a lexeme ending in `*/`.
    Block,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            reader: SourceReader::new(input),
            buffer: String::new(),
            start: (1, 0),
            quote: None,
            escaped: false,
            comment: None,
            tokens: Vec::new(),
        }
    }

    /// Consume the input and return every token in source order.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Ok(c) = self.reader.next() {
            if self.quote.is_some() && c != '\n' {
                self.push_quoted(c);
            } else if c == '\n' {
                self.quote = None;
                self.flush();
                if self.comment == Some(CommentState::Line) {
                    self.comment = None;
                }
                self.emit(TokenKind::EndOfLine, "\n");
            } else if c.is_whitespace() {
                self.flush();
            } else if grammar::is_control_char(c) {
                self.flush();
                self.emit(TokenKind::Control, c.to_string());
            } else {
                if (c == '"' || c == '\'') && self.buffer.is_empty() && self.comment.is_none() {
                    self.quote = Some(c);
                }
                self.push(c);
            }
        }
        self.flush();
        self.tokens
    }

    fn push_quoted(&mut self, c: char) {
        self.push(c);
        if self.escaped {
            self.escaped = false;
        } else if c == '\\' {
            self.escaped = true;
        } else if Some(c) == self.quote {
            self.quote = None;
        }
    }

    fn push(&mut self, c: char) {
        if self.buffer.is_empty() {
            self.start = (self.reader.line(), self.reader.column());
        }
        self.buffer.push(c);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let lexeme = std::mem::take(&mut self.buffer);
        self.track_comment(&lexeme);
        let (line, column) = self.start;
        self.tokens.push(Token::new(
            grammar::classify_lexeme(&lexeme),
            line,
            column,
            lexeme,
        ));
        self.escaped = false;
    }

    fn track_comment(&mut self, lexeme: &str) {
        match self.comment {
            None if grammar::is_line_comment(lexeme) => {
                self.comment = Some(CommentState::Line);
            }
            None if grammar::is_block_comment_open(lexeme)
                && !(lexeme.len() >= 4 && grammar::is_block_comment_close(lexeme)) =>
            {
                self.comment = Some(CommentState::Block);
            }
            Some(CommentState::Block) if grammar::is_block_comment_close(lexeme) => {
                self.comment = None;
            }
            _ => {}
        }
    }

    fn emit(&mut self, kind: TokenKind, lexeme: impl Into<String>) {
        self.tokens.push(Token::new(
            kind,
            self.reader.line(),
            self.reader.column(),
            lexeme,
        ));
    }
}

/// Tokenize a schema text.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTER: &str = "message Outer {
  option my_option = true;
  message Inner {   // Level 2
    int64 ival = 1;
  }
  map<int32, string> my_map = 2;
}";

    fn lexemes(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("syntax = \"proto3\";");
        assert_eq!(lexemes(&tokens), vec!["syntax", "=", "\"proto3\"", ";"]);
        assert_eq!(tokens[0].kind, TokenKind::Id);
        assert_eq!(tokens[1].kind, TokenKind::Control);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[3].kind, TokenKind::Control);
    }

    #[test]
    fn test_outer_message_counts() {
        let tokens = tokenize(OUTER);
        assert_eq!(tokens.len(), 37);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Id).count(), 4);
        assert_eq!(tokens.iter().filter(|t| t.is_end_of_line()).count(), 6);

        let ids: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Id)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ids, vec!["message", "option", "message", "map"]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("package foo;\n  message");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 9));
        assert_eq!((tokens[2].line, tokens[2].column), (1, 12));
        // end of line sits at the post-read position
        assert!(tokens[3].is_end_of_line());
        assert_eq!((tokens[3].line, tokens[3].column), (2, 0));
        assert_eq!((tokens[4].line, tokens[4].column), (2, 3));
    }

    #[test]
    fn test_quoted_literal_kept_whole() {
        let tokens = tokenize("option x = \"a b; {c}\";");
        assert_eq!(lexemes(&tokens), vec!["option", "x", "=", "\"a b; {c}\"", ";"]);
    }

    #[test]
    fn test_escaped_quote() {
        let tokens = tokenize(r#"option x = "say \"hi\"";"#);
        assert_eq!(tokens[3].lexeme, r#""say \"hi\"""#);
        assert_eq!(tokens[4].lexeme, ";");
    }

    #[test]
    fn test_quote_inside_word_is_text() {
        let tokens = tokenize("user's id");
        assert_eq!(lexemes(&tokens), vec!["user's", "id"]);
    }

    #[test]
    fn test_quotes_in_comments_are_text() {
        let tokens = tokenize("/* 'open id */ message\n// \"half\nenum");
        assert_eq!(
            lexemes(&tokens),
            vec!["/*", "'open", "id", "*/", "message", "\n", "//", "\"half", "\n", "enum"]
        );
    }

    #[test]
    fn test_quotes_open_again_after_comment() {
        let tokens = tokenize("/* x */ option y = \"a b\";");
        assert_eq!(tokens[6].lexeme, "\"a b\"");

        let tokens = tokenize("// note\noption y = 'a b';");
        assert_eq!(tokens[6].lexeme, "'a b'");
    }

    #[test]
    fn test_unterminated_quote_stops_at_line_end() {
        let tokens = tokenize("option x = \"open\nmessage");
        assert_eq!(tokens[3].lexeme, "\"open");
        assert!(tokens[4].is_end_of_line());
        assert_eq!(tokens[5].lexeme, "message");
    }

    #[test]
    fn test_no_trailing_token_for_empty_buffer() {
        assert_eq!(tokenize("a;").len(), 2);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_crlf_is_one_line_break() {
        let tokens = tokenize("a\r\nb");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_no_character_dropped() {
        let input = "message A{int32 x=1;map<string,Foo.Bar>m=2[deprecated=true];}";
        let tokens = tokenize(input);
        let rebuilt: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        let expected: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_token_equality_ignores_case() {
        let a = Token::new(TokenKind::String, 1, 1, "Foo");
        let b = Token::new(TokenKind::String, 1, 1, "FOO");
        let c = Token::new(TokenKind::String, 1, 2, "Foo");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let token = Token::new(TokenKind::Numeric, 4, 12, "0x1F");
        assert_eq!(token.to_string(), "0x1F L4:C12");
        let eol = Token::new(TokenKind::EndOfLine, 2, 0, "\n");
        assert_eq!(eol.to_string(), "\\n L2:C0");
    }
}
