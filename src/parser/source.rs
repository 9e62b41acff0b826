//! Character reader with line/column tracking.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::SourceError;

/// Streams the characters of a schema text.
///
/// `line` and `column` describe the last character returned by
/// [`SourceReader::next`]. `\r\n`, `\r` and `\n` are each one line break and
/// are all returned as `'\n'`.
pub struct SourceReader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> SourceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        SourceReader {
            chars: input.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Read the next character.
    pub fn next(&mut self) -> Result<char, SourceError> {
        let c = self.chars.next().ok_or(SourceError::EndOfInput {
            line: self.line,
            column: self.column,
        })?;

        match c {
            '\r' => {
                // CR LF counts once
                self.chars.next_if_eq(&'\n');
                self.break_line();
                Ok('\n')
            }
            '\n' => {
                self.break_line();
                Ok('\n')
            }
            _ => {
                self.column += 1;
                Ok(c)
            }
        }
    }

    fn break_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_through(reader: &mut SourceReader, target: char) {
        while reader.next().unwrap() != target {}
    }

    #[test]
    fn test_initial_position() {
        let reader = SourceReader::new("abc");
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.column(), 0);
    }

    #[test]
    fn test_mixed_line_endings() {
        let mut reader = SourceReader::new("L1\r\nL2\rL3\nL4");

        read_through(&mut reader, '2');
        assert_eq!((reader.line(), reader.column()), (2, 2));

        read_through(&mut reader, '3');
        assert_eq!((reader.line(), reader.column()), (3, 2));

        read_through(&mut reader, '4');
        assert_eq!((reader.line(), reader.column()), (4, 2));

        assert!(reader.at_end());
        assert_eq!(reader.column(), 2);
        assert_eq!(
            reader.next(),
            Err(SourceError::EndOfInput { line: 4, column: 2 })
        );
    }

    #[test]
    fn test_line_breaks_normalized() {
        let mut reader = SourceReader::new("a\r\nb\rc");
        let chars: Vec<char> = std::iter::from_fn(|| reader.next().ok()).collect();
        assert_eq!(chars, vec!['a', '\n', 'b', '\n', 'c']);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = SourceReader::new("");
        assert!(reader.at_end());
        assert!(reader.next().is_err());
    }
}
