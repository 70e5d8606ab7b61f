//! Reading configuration metadata off facet shapes.
//!
//! Fields opt into configuration behavior with arbitrary facet attributes:
//!
//! - `#[facet(path = "a.b")]` sets the path segments of the field (default: its name)
//! - `#[facet(fallback = "value")]` is used when no provider has a value
//! - `#[facet(required)]` makes a missing value an error
//! - `#[facet(config_skip)]` hides the field from configuration entirely
//!
//! facet's own `#[facet(sensitive)]` masks the field's value in logs.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use facet_core::{Def, Field, FieldAttribute, FieldFlags, KnownSmartPointer, Shape, Type, UserType};

use crate::path::split_declared;
use crate::{ConfigError, ConfigErrorKind, ConfigPath};

/// What a declared field holds, as far as configuration is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A `String` leaf, resolved through the provider chain
    Scalar,
    /// A struct stored inline in its parent
    Record,
    /// A `Box` of a struct, allocated by the engine
    BoxedRecord,
    /// Anything else, rejected when the engine reaches it
    Unsupported,
}

impl FieldKind {
    /// Classifies a field's shape.
    pub fn of<'shape>(shape: &'shape Shape<'shape>) -> Self {
        if shape.is_type::<String>() {
            return FieldKind::Scalar;
        }
        if let Type::User(UserType::Struct(_)) = shape.ty {
            return FieldKind::Record;
        }
        if boxed_record(shape).is_some() {
            return FieldKind::BoxedRecord;
        }
        FieldKind::Unsupported
    }

    /// Whether the engine descends into fields of this kind.
    pub fn is_record(self) -> bool {
        matches!(self, FieldKind::Record | FieldKind::BoxedRecord)
    }
}

/// The struct behind a `Box<T>` field, if that is what `shape` is.
///
/// Only `Box` qualifies: it gives the parent exclusive ownership of the record.
pub(crate) fn boxed_record<'shape>(shape: &'shape Shape<'shape>) -> Option<&'shape Shape<'shape>> {
    let Def::SmartPointer(def) = shape.def else {
        return None;
    };
    if !matches!(def.known, Some(KnownSmartPointer::Box)) {
        return None;
    }
    let pointee = def.pointee()?;
    match pointee.ty {
        Type::User(UserType::Struct(_)) => Some(pointee),
        _ => None,
    }
}

/// Configuration metadata of one declared field.
#[derive(Clone, Debug)]
pub struct SchemaNode<'shape> {
    /// The field as facet describes it
    pub field: &'shape Field<'shape>,
    /// Path segments this field contributes, from `path` or the field name
    pub segments: Vec<String>,
    /// Literal value used when no provider has one
    pub fallback: Option<&'shape str>,
    /// Whether a missing value is an error
    pub required: bool,
    /// Whether the field is hidden from configuration
    pub skipped: bool,
    /// Whether the value must be masked in logs
    pub sensitive: bool,
}

impl<'shape> SchemaNode<'shape> {
    /// Reads the configuration attributes of `field`.
    pub fn parse(field: &'shape Field<'shape>) -> Result<Self, ConfigErrorKind> {
        let mut node = SchemaNode {
            field,
            segments: Vec::new(),
            fallback: None,
            required: false,
            skipped: false,
            sensitive: field.flags.contains(FieldFlags::SENSITIVE),
        };
        let mut declared_path = None;

        for attr in field.attributes {
            let FieldAttribute::Arbitrary(content) = *attr else {
                continue;
            };
            match split_attr(content) {
                ("path", Some(value)) => declared_path = Some(value),
                ("fallback", Some(value)) => node.fallback = Some(value),
                ("required", None) => node.required = true,
                ("config_skip", None) => node.skipped = true,
                _ => {}
            }
        }

        node.segments = match declared_path {
            Some(declared) => {
                split_declared(declared).map_err(|_| ConfigErrorKind::InvalidPath {
                    field: field.name.to_string(),
                    declared: declared.to_string(),
                })?
            }
            None => alloc::vec![field.name.to_string()],
        };

        Ok(node)
    }

    /// Name of the field in the Rust struct.
    pub fn name(&self) -> &'shape str {
        self.field.name
    }

    /// Shape of the field's type.
    pub fn shape(&self) -> &'shape Shape<'shape> {
        self.field.shape()
    }

    /// How the engine treats this field.
    pub fn kind(&self) -> FieldKind {
        FieldKind::of(self.shape())
    }
}

/// Splits `key = "value"` (or a bare `key`) as facet-derive hands it over.
fn split_attr(content: &str) -> (&str, Option<&str>) {
    match content.split_once('=') {
        Some((key, value)) => {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim(), Some(value))
        }
        None => (content.trim(), None),
    }
}

/// One queued unit of work: a field, the record that owns it, and its full path.
#[derive(Clone, Debug)]
pub struct FieldDescriptor<'shape> {
    /// Configuration metadata of the field
    pub node: SchemaNode<'shape>,
    /// Shape of the record the field belongs to
    pub owner: &'shape Shape<'shape>,
    /// Fully-qualified path of the field
    pub path: ConfigPath,
}

fn struct_fields<'shape>(
    record: &'shape Shape<'shape>,
    parent: &ConfigPath,
) -> Result<&'shape [Field<'shape>], ConfigError> {
    match &record.ty {
        Type::User(UserType::Struct(st)) => Ok(st.fields),
        _ => Err(ConfigError::new(
            ConfigErrorKind::NotARecord {
                type_name: record.to_string(),
            },
            parent.clone(),
        )),
    }
}

/// Enumerates the fields of `record` that are visible to configuration, with
/// their paths computed under `parent`.
///
/// This does not descend into nested records: the engine calls it again once
/// it has instantiated them. Fields come back in declaration order, and the
/// same inputs always yield the same paths.
pub fn enumerate<'shape>(
    record: &'shape Shape<'shape>,
    parent: &ConfigPath,
) -> Result<Vec<FieldDescriptor<'shape>>, ConfigError> {
    let mut descriptors = Vec::new();
    for field in struct_fields(record, parent)? {
        // Skipped fields are invisible, malformed attributes included.
        if is_skipped(field) {
            continue;
        }
        let node = SchemaNode::parse(field)
            .map_err(|kind| ConfigError::new(kind, parent.join(&[field.name])))?;
        let path = parent.join(node.segments.as_slice());
        descriptors.push(FieldDescriptor {
            node,
            owner: record,
            path,
        });
    }
    Ok(descriptors)
}

fn is_skipped(field: &Field<'_>) -> bool {
    field.attributes.iter().any(|attr| {
        matches!(attr, FieldAttribute::Arbitrary(content) if split_attr(content) == ("config_skip", None))
    })
}

/// Fields of `record` marked `config_skip`.
pub(crate) fn skipped_fields<'shape>(
    record: &'shape Shape<'shape>,
) -> impl Iterator<Item = &'shape Field<'shape>> {
    let fields: &'shape [Field<'shape>] = match &record.ty {
        Type::User(UserType::Struct(st)) => st.fields,
        _ => &[],
    };
    fields.iter().filter(|field| is_skipped(field))
}

/// Lists the path of every leaf the engine would resolve for `shape`, in
/// traversal order, without querying any provider.
///
/// Unsupported field types are reported the same way population reports them.
pub(crate) fn leaf_paths<'shape>(shape: &'shape Shape<'shape>) -> Result<Vec<ConfigPath>, ConfigError> {
    let mut stack = enumerate(shape, &ConfigPath::root())?;
    stack.reverse();

    let mut paths = Vec::new();
    while let Some(descriptor) = stack.pop() {
        match descriptor.node.kind() {
            FieldKind::Scalar => paths.push(descriptor.path),
            FieldKind::Record => {
                let mut children = enumerate(descriptor.node.shape(), &descriptor.path)?;
                children.reverse();
                stack.extend(children);
            }
            FieldKind::BoxedRecord => {
                let pointee = boxed_record(descriptor.node.shape())
                    .ok_or_else(|| schema_type_error(&descriptor))?;
                let mut children = enumerate(pointee, &descriptor.path)?;
                children.reverse();
                stack.extend(children);
            }
            FieldKind::Unsupported => return Err(schema_type_error(&descriptor)),
        }
    }
    Ok(paths)
}

pub(crate) fn schema_type_error(descriptor: &FieldDescriptor<'_>) -> ConfigError {
    ConfigError::new(
        ConfigErrorKind::SchemaType {
            field: descriptor.node.name().to_string(),
            type_name: descriptor.node.shape().to_string(),
        },
        descriptor.path.clone(),
    )
}
