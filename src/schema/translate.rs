use crate::schema::{
    ArgTypes, Control, ControlKind, JsonType, PropDescriptor, PropShape, PropsSchema,
    SchemaProperty,
};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Functions, refs, symbols and framework nodes cannot be produced by a caller.
    NonSerializableType,
    ControlDisabled,
    FileInput,
    NullType,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonSerializableType => "non-serializable type",
            Self::ControlDisabled => "control disabled (non-serializable)",
            Self::FileInput => "file input (non-serializable)",
            Self::NullType => "null type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Property(SchemaProperty),
    Excluded(ExclusionReason),
}

impl Translation {
    pub fn property(self) -> Option<SchemaProperty> {
        match self {
            Self::Property(property) => Some(property),
            Self::Excluded(_) => None,
        }
    }
}

pub fn translate(descriptor: &PropDescriptor) -> Translation {
    if excluded_by_type_hint(descriptor.type_name.as_deref()) {
        return Translation::Excluded(ExclusionReason::NonSerializableType);
    }

    let spec = match &descriptor.control {
        Some(Control::Disabled) => {
            return Translation::Excluded(ExclusionReason::ControlDisabled);
        }
        Some(Control::Enabled(spec)) => Some(spec),
        None => None,
    };

    let shape = match spec.and_then(|spec| spec.kind.as_ref()) {
        Some(ControlKind::Text | ControlKind::Color) => PropShape::String,
        Some(ControlKind::Number | ControlKind::Range) => PropShape::Number {
            minimum: spec.and_then(|spec| spec.min.clone()),
            maximum: spec.and_then(|spec| spec.max.clone()),
        },
        Some(ControlKind::Boolean) => PropShape::Boolean,
        Some(ControlKind::Select | ControlKind::Radio | ControlKind::InlineRadio) => {
            choice_shape(descriptor.options.as_deref())
        }
        Some(ControlKind::MultiSelect | ControlKind::Check | ControlKind::InlineCheck) => {
            PropShape::StringArray {
                options: descriptor.options.clone(),
            }
        }
        Some(ControlKind::Object) => PropShape::Object { open: true },
        Some(ControlKind::Date) => PropShape::DateTime,
        Some(ControlKind::File) => {
            return Translation::Excluded(ExclusionReason::FileInput);
        }
        Some(ControlKind::Unknown(_)) | None => {
            match infer_from_type_name(descriptor.type_name.as_deref()) {
                Some(shape) => shape,
                None => return Translation::Excluded(ExclusionReason::NullType),
            }
        }
    };

    Translation::Property(
        SchemaProperty::new(shape).with_description(descriptor.description.clone()),
    )
}

/// Builds the object schema for a story's arg types, dropping every prop that
/// cannot be set from outside.
pub fn props_schema(arg_types: &ArgTypes) -> PropsSchema {
    let mut schema = PropsSchema::default();

    for (prop_name, arg_type) in arg_types {
        let descriptor = PropDescriptor::from_arg_type(prop_name, arg_type);
        match translate(&descriptor) {
            Translation::Property(property) => {
                if descriptor.required {
                    schema.required.push(prop_name.clone());
                }
                schema.properties.insert(prop_name.clone(), property);
            }
            Translation::Excluded(reason) => {
                debug!(prop = %prop_name, reason = reason.as_str(), "prop excluded from schema");
            }
        }
    }

    schema
}

fn excluded_by_type_hint(type_name: Option<&str>) -> bool {
    let Some(type_name) = type_name else {
        return false;
    };
    let normalized = type_name.trim().to_lowercase();

    normalized.contains("function")
        || normalized.starts_with('(')
        || normalized.contains("reactnode")
        || normalized.contains("element")
        || normalized.contains("jsx")
        || normalized.contains("ref")
        || normalized == "symbol"
}

fn choice_shape(options: Option<&[Value]>) -> PropShape {
    let Some(options) = options.filter(|options| !options.is_empty()) else {
        return PropShape::String;
    };

    let kinds: BTreeSet<&'static str> = options.iter().map(literal_kind).collect();
    let value_type = match kinds.iter().next() {
        Some(&"string") if kinds.len() == 1 => Some(JsonType::String),
        Some(&"number") if kinds.len() == 1 => Some(JsonType::Number),
        _ => None,
    };

    PropShape::Enum {
        value_type,
        options: options.to_vec(),
    }
}

/// Literal kind of an option value; `null` and arrays count as objects.
fn literal_kind(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

fn infer_from_type_name(type_name: Option<&str>) -> Option<PropShape> {
    let Some(type_name) = type_name else {
        return Some(PropShape::String);
    };
    let normalized = type_name.to_lowercase();

    if normalized.contains('|') {
        let mut types = Vec::new();
        for part in normalized.split('|').map(str::trim) {
            if let Some(kind) = infer_single_type(part) {
                if !types.contains(&kind) {
                    types.push(kind);
                }
            }
        }
        return match types.as_slice() {
            [] => Some(PropShape::String),
            [single] => shape_for(*single),
            _ => Some(PropShape::Union(types)),
        };
    }

    match infer_single_type(normalized.trim()) {
        Some(kind) => shape_for(kind),
        None => Some(PropShape::String),
    }
}

fn infer_single_type(type_name: &str) -> Option<JsonType> {
    match type_name {
        "string" => Some(JsonType::String),
        "number" | "integer" => Some(JsonType::Number),
        "boolean" | "bool" => Some(JsonType::Boolean),
        "object" => Some(JsonType::Object),
        "array" => Some(JsonType::Array),
        "null" | "undefined" => Some(JsonType::Null),
        _ => None,
    }
}

fn shape_for(kind: JsonType) -> Option<PropShape> {
    match kind {
        JsonType::String => Some(PropShape::String),
        JsonType::Number => Some(PropShape::Number {
            minimum: None,
            maximum: None,
        }),
        JsonType::Boolean => Some(PropShape::Boolean),
        JsonType::Object => Some(PropShape::Object { open: false }),
        JsonType::Array => Some(PropShape::Array),
        JsonType::Null => None,
    }
}
