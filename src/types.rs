use std::fmt;
use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::Serialize;

/// An identifier from a schema file.
///
/// Names compare equal regardless of ASCII case, which gives every
/// descriptor type below a structural equality with case-insensitive names.
#[derive(Debug, Clone, Default, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Name(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_string())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The language version declared by `syntax = "...";`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Syntax {
    Proto2,
    Proto3,
}

impl Syntax {
    pub fn from_name(name: &str) -> Option<Syntax> {
        match name {
            "proto2" => Some(Syntax::Proto2),
            "proto3" => Some(Syntax::Proto3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

/// The built-in field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Uint32,
        ScalarType::Uint64,
        ScalarType::Sint32,
        ScalarType::Sint64,
        ScalarType::Fixed32,
        ScalarType::Fixed64,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
    ];

    pub fn from_name(name: &str) -> Option<ScalarType> {
        ScalarType::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }

    /// Whether the type may be used as a map key.
    /// Floating point and bytes keys are rejected.
    pub fn is_map_key(&self) -> bool {
        !matches!(
            self,
            ScalarType::Double | ScalarType::Float | ScalarType::Bytes
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type of a field: a scalar or a reference to a message/enum.
/// User type names are kept as written; they are not resolved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum FieldType {
    Scalar(ScalarType),
    User(Name),
}

impl FieldType {
    /// Scalar when the name is a built-in type, user type otherwise.
    pub fn from_name(name: &str) -> FieldType {
        match ScalarType::from_name(name) {
            Some(scalar) => FieldType::Scalar(scalar),
            None => FieldType::User(Name::from(name)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => s.fmt(f),
            FieldType::User(n) => n.fmt(f),
        }
    }
}

/// `option name = value;`, also used for bracketed field options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProtoOption {
    pub name: Name,
    /// The constant as written, with quotes removed from string literals.
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ImportModifier {
    #[default]
    None,
    Weak,
    Public,
}

impl ImportModifier {
    pub fn from_name(name: &str) -> Option<ImportModifier> {
        match name {
            "weak" => Some(ImportModifier::Weak),
            "public" => Some(ImportModifier::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Import {
    pub modifier: ImportModifier,
    pub path: String,
}

/// A field definition within a message or oneof.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Field {
    pub name: Name,
    /// Field number (unique within the message, not checked here).
    pub number: u32,
    pub field_type: FieldType,
    pub repeated: bool,
    /// Explicit `optional` label.
    pub optional: bool,
    pub options: Vec<ProtoOption>,
}

/// `map<Key, Value> name = number;`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MapField {
    pub name: Name,
    pub number: u32,
    pub key: ScalarType,
    pub value: FieldType,
    pub options: Vec<ProtoOption>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OneOfDefinition {
    pub name: Name,
    pub fields: Vec<Field>,
    pub options: Vec<ProtoOption>,
}

/// Upper bound of a reserved range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RangeEnd {
    Number(i64),
    /// `to max`
    Max,
}

/// An inclusive range of reserved numbers. A single number has `end == start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ReservedRange {
    pub start: i64,
    pub end: RangeEnd,
}

impl ReservedRange {
    pub fn contains(&self, number: i64) -> bool {
        match self.end {
            RangeEnd::Number(end) => (self.start..=end).contains(&number),
            RangeEnd::Max => number >= self.start,
        }
    }
}

/// One `reserved` statement. A statement reserves either names or numbers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Reserved {
    Names(Vec<Name>),
    Ranges(Vec<ReservedRange>),
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MessageDefinition {
    pub name: Name,
    pub fields: Vec<Field>,
    pub oneofs: Vec<OneOfDefinition>,
    pub options: Vec<ProtoOption>,
    pub maps: Vec<MapField>,
    pub nested_enums: Vec<EnumDefinition>,
    pub nested_messages: Vec<MessageDefinition>,
    pub reserved: Vec<Reserved>,
}

impl MessageDefinition {
    /// Find a direct field by name, including fields inside oneofs.
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .chain(self.oneofs.iter().flat_map(|o| o.fields.iter()))
            .find(|f| f.name == name)
    }

    pub fn find_nested_message(&self, name: &str) -> Option<&MessageDefinition> {
        self.nested_messages.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnumField {
    pub name: Name,
    pub number: i32,
    pub options: Vec<ProtoOption>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnumDefinition {
    pub name: Name,
    pub options: Vec<ProtoOption>,
    pub fields: Vec<EnumField>,
    pub reserved: Vec<Reserved>,
}

/// Request or response type of an rpc.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MethodType {
    pub name: Name,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ServiceMethod {
    pub name: Name,
    pub input: MethodType,
    pub output: MethodType,
    pub options: Vec<ProtoOption>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ServiceDefinition {
    pub name: Name,
    pub methods: Vec<ServiceMethod>,
    pub options: Vec<ProtoOption>,
}

/// The lowered form of one schema file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileDescriptor {
    /// `None` when the file has no syntax statement.
    pub syntax: Option<Syntax>,
    pub package: Option<Name>,
    pub options: Vec<ProtoOption>,
    pub imports: Vec<Import>,
    pub messages: Vec<MessageDefinition>,
    pub enumerations: Vec<EnumDefinition>,
    pub services: Vec<ServiceDefinition>,
}

impl FileDescriptor {
    /// Get a top-level message by name.
    pub fn get_message(&self, name: &str) -> Option<&MessageDefinition> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Get a top-level enum by name.
    pub fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.enumerations.iter().find(|e| e.name == name)
    }

    /// Get a service by name.
    pub fn get_service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Get a file-level option value by name.
    pub fn get_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }
}
