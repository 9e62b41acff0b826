pub mod analyzer;
pub mod ast;
pub mod cursor;
pub mod grammar;
pub mod lexer;
pub mod schema_builder;
pub mod source;

use tracing::debug;

use crate::error::{ParseError, ProtoError};
use crate::types::FileDescriptor;
use ast::ParseTree;

pub use lexer::tokenize;

/// Tokenize and analyze schema text into a parse tree.
///
/// Malformed statements never abort the pass; they are skipped and reported
/// in [`ParseTree::errors`].
pub fn analyze(schema_text: &str) -> ParseTree {
    let tokens = tokenize(schema_text);
    debug!(tokens = tokens.len(), "tokenized schema");
    analyzer::analyze_tokens(&tokens)
}

/// A lowered schema file together with the statements that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub descriptor: FileDescriptor,
    pub errors: Vec<ParseError>,
}

impl ParsedFile {
    /// True when every statement in the file was well formed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse schema text into a `FileDescriptor`.
///
/// This is the main entry point for the parser module.
pub fn parse(schema_text: &str) -> Result<ParsedFile, ProtoError> {
    let tree = analyze(schema_text);
    let descriptor = schema_builder::build_descriptor(&tree.root)?;
    Ok(ParsedFile {
        descriptor,
        errors: tree.errors,
    })
}
