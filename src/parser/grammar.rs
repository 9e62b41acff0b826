//! Static tables and predicates that classify lexemes and statements.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::lexer::TokenKind;
use crate::types::ScalarType;

/// Lexemes the lexer tags as [`TokenKind::Id`].
pub const KEYWORDS: [&str; 8] = [
    "syntax", "import", "package", "option", "enum", "message", "oneof", "map",
];

/// Single characters that always form their own token.
pub const CONTROL_CHARS: [char; 11] = [';', '{', '}', '=', ',', '<', '>', '[', ']', '(', ')'];

/// Statements delimited by a `{ }` block (or a block comment).
pub const BLOCK_KEYWORDS: [&str; 4] = ["enum", "message", "service", "/*"];

/// Statements terminated by `;` (or the end of a line comment).
pub const LINE_KEYWORDS: [&str; 5] = ["syntax", "import", "package", "option", "//"];

/// Largest valid field number.
pub const MAX_FIELD_NUMBER: i64 = 536_870_911;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"[+-]?0[xX][0-9a-fA-F]+",
        r"|[+-]?0[0-7]+",
        r"|[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?",
        r"|[+-]?inf|nan",
        r")$"
    ))
    .expect("numeric pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static FULL_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("full identifier pattern is valid")
});

pub fn is_keyword(lexeme: &str) -> bool {
    KEYWORDS.contains(&lexeme)
}

pub fn is_numeric(lexeme: &str) -> bool {
    NUMERIC.is_match(lexeme)
}

pub fn is_control_char(c: char) -> bool {
    CONTROL_CHARS.contains(&c)
}

/// Classify a flushed lexeme. Order matters: keywords, numbers, punctuation,
/// then everything else is text.
pub fn classify_lexeme(lexeme: &str) -> TokenKind {
    let mut chars = lexeme.chars();
    if is_keyword(lexeme) {
        TokenKind::Id
    } else if is_numeric(lexeme) {
        TokenKind::Numeric
    } else if let (Some(c), None) = (chars.next(), chars.next()) {
        if is_control_char(c) {
            TokenKind::Control
        } else {
            TokenKind::String
        }
    } else {
        TokenKind::String
    }
}

pub fn is_block_statement(lexeme: &str) -> bool {
    BLOCK_KEYWORDS.contains(&lexeme) || is_block_comment_open(lexeme)
}

pub fn is_line_statement(lexeme: &str) -> bool {
    LINE_KEYWORDS.contains(&lexeme) || is_line_comment(lexeme)
}

pub fn is_scalar_type(lexeme: &str) -> bool {
    ScalarType::from_name(lexeme).is_some()
}

pub fn is_map_key_type(lexeme: &str) -> bool {
    ScalarType::from_name(lexeme).is_some_and(|t| t.is_map_key())
}

pub fn is_assignment(lexeme: &str) -> bool {
    lexeme == "="
}

pub fn is_terminator(lexeme: &str) -> bool {
    lexeme == ";"
}

pub fn is_separator(lexeme: &str) -> bool {
    lexeme == ","
}

pub fn is_open_brace(lexeme: &str) -> bool {
    lexeme == "{"
}

pub fn is_close_brace(lexeme: &str) -> bool {
    lexeme == "}"
}

pub fn is_open_bracket(lexeme: &str) -> bool {
    lexeme == "["
}

pub fn is_close_bracket(lexeme: &str) -> bool {
    lexeme == "]"
}

pub fn is_open_paren(lexeme: &str) -> bool {
    lexeme == "("
}

pub fn is_close_paren(lexeme: &str) -> bool {
    lexeme == ")"
}

pub fn is_line_comment(lexeme: &str) -> bool {
    lexeme.starts_with("//")
}

pub fn is_block_comment_open(lexeme: &str) -> bool {
    lexeme.starts_with("/*")
}

/// Whether the lexeme ends a block comment. The opening `/*` itself never
/// counts as its own closing `*/`.
pub fn is_block_comment_close(lexeme: &str) -> bool {
    lexeme.ends_with("*/") && !(lexeme == "/*/")
}

pub fn is_identifier(lexeme: &str) -> bool {
    IDENTIFIER.is_match(lexeme)
}

/// Dotted identifier, e.g. `foo.bar.Baz`.
pub fn is_full_identifier(lexeme: &str) -> bool {
    FULL_IDENTIFIER.is_match(lexeme)
}

/// A message or enum type reference, optionally fully qualified with a
/// leading dot.
pub fn is_type_reference(lexeme: &str) -> bool {
    is_full_identifier(lexeme.strip_prefix('.').unwrap_or(lexeme))
}

pub fn is_quoted(lexeme: &str) -> bool {
    unquote(lexeme).is_some()
}

/// Strip matching single or double quotes.
pub fn unquote(lexeme: &str) -> Option<&str> {
    let quote = lexeme.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    lexeme
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
}

/// Decode backslash escapes in the body of a quoted literal. Unknown
/// escapes are kept as written.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('0') => decoded.push('\0'),
            Some(c @ ('\\' | '"' | '\'')) => decoded.push(c),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }
    Cow::Owned(decoded)
}

/// Parse an integer literal in decimal, octal (`0` prefix) or hex (`0x`).
pub fn parse_integer(lexeme: &str) -> Option<i64> {
    let (negative, digits) = match lexeme.as_bytes().first() {
        Some(b'-') => (true, &lexeme[1..]),
        Some(b'+') => (false, &lexeme[1..]),
        _ => (false, lexeme),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse::<i64>().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Statements allowed at file level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelStatement {
    Syntax,
    Import,
    Package,
    Option,
    Message,
    Enum,
    Service,
    LineComment,
    BlockComment,
    NotFound,
}

pub fn classify_top_level(lexeme: &str) -> TopLevelStatement {
    if is_line_comment(lexeme) {
        return TopLevelStatement::LineComment;
    }
    if is_block_comment_open(lexeme) {
        return TopLevelStatement::BlockComment;
    }
    match lexeme {
        "syntax" => TopLevelStatement::Syntax,
        "import" => TopLevelStatement::Import,
        "package" => TopLevelStatement::Package,
        "option" => TopLevelStatement::Option,
        "message" => TopLevelStatement::Message,
        "enum" => TopLevelStatement::Enum,
        "service" => TopLevelStatement::Service,
        _ => TopLevelStatement::NotFound,
    }
}

/// Statements allowed inside a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatement {
    Field,
    Message,
    Enum,
    Map,
    Reserved,
    OneOf,
    Option,
    LineComment,
    BlockComment,
    NotFound,
}

pub fn classify_message_member(lexeme: &str) -> MessageStatement {
    if is_line_comment(lexeme) {
        return MessageStatement::LineComment;
    }
    if is_block_comment_open(lexeme) {
        return MessageStatement::BlockComment;
    }
    match lexeme {
        "message" => MessageStatement::Message,
        "enum" => MessageStatement::Enum,
        "map" => MessageStatement::Map,
        "reserved" => MessageStatement::Reserved,
        "oneof" => MessageStatement::OneOf,
        "option" => MessageStatement::Option,
        "repeated" | "optional" => MessageStatement::Field,
        _ if is_keyword(lexeme) => MessageStatement::NotFound,
        _ if is_scalar_type(lexeme) || is_type_reference(lexeme) => MessageStatement::Field,
        _ => MessageStatement::NotFound,
    }
}

/// Statements allowed inside an enum body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStatement {
    Constant,
    Option,
    Reserved,
    LineComment,
    BlockComment,
    NotFound,
}

pub fn classify_enum_member(lexeme: &str) -> EnumStatement {
    if is_line_comment(lexeme) {
        return EnumStatement::LineComment;
    }
    if is_block_comment_open(lexeme) {
        return EnumStatement::BlockComment;
    }
    match lexeme {
        "option" => EnumStatement::Option,
        "reserved" => EnumStatement::Reserved,
        _ if !is_keyword(lexeme) && is_identifier(lexeme) => EnumStatement::Constant,
        _ => EnumStatement::NotFound,
    }
}

/// Statements allowed inside a oneof body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneOfStatement {
    Field,
    Option,
    LineComment,
    BlockComment,
    NotFound,
}

pub fn classify_oneof_member(lexeme: &str) -> OneOfStatement {
    if is_line_comment(lexeme) {
        return OneOfStatement::LineComment;
    }
    if is_block_comment_open(lexeme) {
        return OneOfStatement::BlockComment;
    }
    match lexeme {
        "option" => OneOfStatement::Option,
        // oneof fields carry no label
        "repeated" | "optional" => OneOfStatement::NotFound,
        _ if is_keyword(lexeme) => OneOfStatement::NotFound,
        _ if is_scalar_type(lexeme) || is_type_reference(lexeme) => OneOfStatement::Field,
        _ => OneOfStatement::NotFound,
    }
}

/// Statements allowed inside a service body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatement {
    Method,
    Option,
    LineComment,
    BlockComment,
    NotFound,
}

pub fn classify_service_member(lexeme: &str) -> ServiceStatement {
    if is_line_comment(lexeme) {
        return ServiceStatement::LineComment;
    }
    if is_block_comment_open(lexeme) {
        return ServiceStatement::BlockComment;
    }
    match lexeme {
        "rpc" => ServiceStatement::Method,
        "option" => ServiceStatement::Option,
        _ => ServiceStatement::NotFound,
    }
}
