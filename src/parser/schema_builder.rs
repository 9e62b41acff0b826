//! Lowering of a parse tree into a [`FileDescriptor`].
//!
//! The analyzer only attaches well-formed statements to the tree, so the
//! builders here assume the node shapes it produces. Anything else is
//! reported as a [`LowerError`] rather than silently dropped.

use tracing::debug;

use super::ast::{NodeKind, ParseNode};
use super::grammar;
use crate::error::LowerError;
use crate::types::*;

/// Build a `FileDescriptor` from the root of a parse tree.
pub fn build_descriptor(root: &ParseNode) -> Result<FileDescriptor, LowerError> {
    if !root.is_root() {
        return Err(LowerError::NotRoot { found: root.kind });
    }

    let mut descriptor = FileDescriptor::default();
    for node in &root.children {
        match node.kind {
            NodeKind::Syntax => descriptor.syntax = Some(build_syntax(node)?),
            NodeKind::Package => {
                let name = required(node, NodeKind::Identifier)?;
                descriptor.package = Some(Name::from(name.value.as_str()));
            }
            NodeKind::Import => descriptor.imports.push(build_import(node)?),
            NodeKind::Option => descriptor.options.push(build_option(node)?),
            NodeKind::Message => descriptor.messages.push(build_message(node)?),
            NodeKind::Enum => descriptor.enumerations.push(build_enum(node)?),
            NodeKind::Service => descriptor.services.push(build_service(node)?),
            NodeKind::Comment => {}
            found => {
                return Err(LowerError::UnexpectedChild {
                    parent: NodeKind::Root,
                    found,
                })
            }
        }
    }

    debug!(
        messages = descriptor.messages.len(),
        enums = descriptor.enumerations.len(),
        services = descriptor.services.len(),
        "built descriptor"
    );
    Ok(descriptor)
}

/// Find the first child of `kind`, or fail naming the parent.
fn required(node: &ParseNode, kind: NodeKind) -> Result<&ParseNode, LowerError> {
    node.child(kind).ok_or_else(|| LowerError::MissingChild {
        parent: node.kind,
        value: node.value.clone(),
        expected: kind,
    })
}

fn invalid(node: &ParseNode) -> LowerError {
    LowerError::InvalidValue {
        kind: node.kind,
        value: node.value.clone(),
    }
}

fn name_of(node: &ParseNode) -> Result<Name, LowerError> {
    Ok(Name::from(required(node, NodeKind::Identifier)?.value.as_str()))
}

/// Parse a number node into the target width.
fn number<T: TryFrom<i64>>(node: &ParseNode) -> Result<T, LowerError> {
    grammar::parse_integer(&node.value)
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| invalid(node))
}

fn options_of(node: &ParseNode) -> Result<Vec<ProtoOption>, LowerError> {
    node.children_of(NodeKind::Option).map(build_option).collect()
}

fn build_syntax(node: &ParseNode) -> Result<Syntax, LowerError> {
    let version = required(node, NodeKind::StringLiteral)?;
    Syntax::from_name(&version.value).ok_or_else(|| invalid(version))
}

fn build_import(node: &ParseNode) -> Result<Import, LowerError> {
    let modifier = match node.child(NodeKind::ImportModifier) {
        Some(m) => ImportModifier::from_name(&m.value).ok_or_else(|| invalid(m))?,
        None => ImportModifier::None,
    };
    Ok(Import {
        modifier,
        path: required(node, NodeKind::StringLiteral)?.value.clone(),
    })
}

fn build_option(node: &ParseNode) -> Result<ProtoOption, LowerError> {
    Ok(ProtoOption {
        name: name_of(node)?,
        value: required(node, NodeKind::OptionValue)?.value.clone(),
    })
}

fn build_message(node: &ParseNode) -> Result<MessageDefinition, LowerError> {
    let mut message = MessageDefinition {
        name: name_of(node)?,
        ..Default::default()
    };

    for child in &node.children {
        match child.kind {
            NodeKind::Identifier | NodeKind::Comment => {}
            NodeKind::Field => message.fields.push(build_field(child)?),
            NodeKind::Map => message.maps.push(build_map(child)?),
            NodeKind::OneOf => message.oneofs.push(build_oneof(child)?),
            NodeKind::Message => message.nested_messages.push(build_message(child)?),
            NodeKind::Enum => message.nested_enums.push(build_enum(child)?),
            NodeKind::Option => message.options.push(build_option(child)?),
            NodeKind::Reserved => message.reserved.push(build_reserved(child)?),
            found => {
                return Err(LowerError::UnexpectedChild {
                    parent: NodeKind::Message,
                    found,
                })
            }
        }
    }
    Ok(message)
}

fn build_field(node: &ParseNode) -> Result<Field, LowerError> {
    let field_type = if let Some(scalar) = node.child(NodeKind::Type) {
        ScalarType::from_name(&scalar.value)
            .map(FieldType::Scalar)
            .ok_or_else(|| invalid(scalar))?
    } else {
        let user = required(node, NodeKind::UserType)?;
        FieldType::User(Name::from(user.value.as_str()))
    };

    Ok(Field {
        name: name_of(node)?,
        number: number(required(node, NodeKind::FieldNumber)?)?,
        field_type,
        repeated: node.has_child(NodeKind::Repeated),
        optional: node.has_child(NodeKind::Optional),
        options: options_of(node)?,
    })
}

fn build_map(node: &ParseNode) -> Result<MapField, LowerError> {
    let key = required(node, NodeKind::MapKey)?;
    let value = required(node, NodeKind::MapValue)?;

    Ok(MapField {
        name: name_of(node)?,
        number: number(required(node, NodeKind::FieldNumber)?)?,
        key: ScalarType::from_name(&key.value)
            .filter(ScalarType::is_map_key)
            .ok_or_else(|| invalid(key))?,
        value: FieldType::from_name(&value.value),
        options: options_of(node)?,
    })
}

fn build_oneof(node: &ParseNode) -> Result<OneOfDefinition, LowerError> {
    Ok(OneOfDefinition {
        name: name_of(node)?,
        fields: node
            .children_of(NodeKind::Field)
            .map(build_field)
            .collect::<Result<_, _>>()?,
        options: options_of(node)?,
    })
}

fn build_enum(node: &ParseNode) -> Result<EnumDefinition, LowerError> {
    let mut enumeration = EnumDefinition {
        name: name_of(node)?,
        ..Default::default()
    };

    for child in &node.children {
        match child.kind {
            NodeKind::Identifier | NodeKind::Comment => {}
            NodeKind::EnumConstant => enumeration.fields.push(EnumField {
                name: name_of(child)?,
                number: number(required(child, NodeKind::FieldNumber)?)?,
                options: options_of(child)?,
            }),
            NodeKind::Option => enumeration.options.push(build_option(child)?),
            NodeKind::Reserved => enumeration.reserved.push(build_reserved(child)?),
            found => {
                return Err(LowerError::UnexpectedChild {
                    parent: NodeKind::Enum,
                    found,
                })
            }
        }
    }
    Ok(enumeration)
}

fn build_reserved(node: &ParseNode) -> Result<Reserved, LowerError> {
    if node.has_child(NodeKind::StringLiteral) {
        let names = node
            .children_of(NodeKind::StringLiteral)
            .map(|n| Name::from(n.value.as_str()))
            .collect();
        return Ok(Reserved::Names(names));
    }

    let ranges = node
        .children_of(NodeKind::Range)
        .map(|range| -> Result<ReservedRange, LowerError> {
            let start = number(range)?;
            let end = match range.child(NodeKind::RangeEnd) {
                Some(end) if end.value == "max" => RangeEnd::Max,
                Some(end) => RangeEnd::Number(number(end)?),
                None => RangeEnd::Number(start),
            };
            Ok(ReservedRange { start, end })
        })
        .collect::<Result<_, _>>()?;
    Ok(Reserved::Ranges(ranges))
}

fn build_service(node: &ParseNode) -> Result<ServiceDefinition, LowerError> {
    let mut service = ServiceDefinition {
        name: name_of(node)?,
        ..Default::default()
    };

    for child in &node.children {
        match child.kind {
            NodeKind::Identifier | NodeKind::Comment => {}
            NodeKind::ServiceMethod => service.methods.push(build_method(child)?),
            NodeKind::Option => service.options.push(build_option(child)?),
            found => {
                return Err(LowerError::UnexpectedChild {
                    parent: NodeKind::Service,
                    found,
                })
            }
        }
    }
    Ok(service)
}

fn build_method(node: &ParseNode) -> Result<ServiceMethod, LowerError> {
    let method_type = |kind| {
        required(node, kind).map(|t| MethodType {
            name: Name::from(t.value.as_str()),
            streaming: t.has_child(NodeKind::Stream),
        })
    };

    Ok(ServiceMethod {
        name: name_of(node)?,
        input: method_type(NodeKind::MethodInput)?,
        output: method_type(NodeKind::MethodOutput)?,
        options: options_of(node)?,
    })
}
