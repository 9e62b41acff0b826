//! Protoparse: an error-recovering parser for `.proto` schema files.
//!
//! Schema text goes through a lexer and a statement analyzer that builds a
//! parse tree. Malformed statements are skipped and reported, so one pass
//! collects every problem in the file. The tree is then lowered into a
//! [`FileDescriptor`] describing the messages, enums and services it declares.
//!
//! # Quick Start
//!
//! ```rust
//! use protoparse::parser;
//! use protoparse::types::{FieldType, ScalarType, Syntax};
//!
//! let parsed = parser::parse(r#"
//!     syntax = "proto3";
//!     package example;
//!
//!     message Person {
//!         string name = 1;
//!         int32 age = 2;
//!     }
//! "#).unwrap();
//!
//! assert!(parsed.is_clean());
//! assert_eq!(parsed.descriptor.syntax, Some(Syntax::Proto3));
//!
//! let person = parsed.descriptor.get_message("Person").unwrap();
//! let age = person.find_field("age").unwrap();
//! assert_eq!(age.number, 2);
//! assert_eq!(age.field_type, FieldType::Scalar(ScalarType::Int32));
//! ```

pub mod error;
pub mod parser;
pub mod types;

pub use error::{ParseError, ProtoError};
pub use parser::{parse, ParsedFile};
pub use types::FileDescriptor;
