//! Prop metadata as stories describe it, and the JSON Schema shapes it
//! translates into.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use indexmap::IndexMap;

pub mod translate;

pub use translate::{props_schema, translate, ExclusionReason, Translation};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Text,
    Color,
    Number,
    Range,
    Boolean,
    Select,
    Radio,
    InlineRadio,
    MultiSelect,
    Check,
    InlineCheck,
    Object,
    Date,
    File,
    Unknown(String),
}

impl ControlKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "color" => Self::Color,
            "number" => Self::Number,
            "range" => Self::Range,
            "boolean" => Self::Boolean,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "inline-radio" => Self::InlineRadio,
            "multi-select" => Self::MultiSelect,
            "check" => Self::Check,
            "inline-check" => Self::InlineCheck,
            "object" => Self::Object,
            "date" => Self::Date,
            "file" => Self::File,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Color => "color",
            Self::Number => "number",
            Self::Range => "range",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::InlineRadio => "inline-radio",
            Self::MultiSelect => "multi-select",
            Self::Check => "check",
            Self::InlineCheck => "inline-check",
            Self::Object => "object",
            Self::Date => "date",
            Self::File => "file",
            Self::Unknown(kind) => kind.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for ControlKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Editing widget attached to a prop. Stories write this as `false`, a bare
/// kind name, or an object with a `type` and optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Disabled,
    Enabled(ControlSpec),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSpec {
    pub kind: Option<ControlKind>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub step: Option<Number>,
}

impl ControlSpec {
    pub fn of_kind(kind: ControlKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawControl {
    Flag(bool),
    Name(String),
    Spec {
        #[serde(rename = "type", default)]
        kind: Option<ControlKind>,
        #[serde(default)]
        min: Option<Number>,
        #[serde(default)]
        max: Option<Number>,
        #[serde(default)]
        step: Option<Number>,
    },
}

impl<'de> Deserialize<'de> for Control {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawControl::deserialize(deserializer)? {
            RawControl::Flag(false) => Self::Disabled,
            RawControl::Flag(true) => Self::Enabled(ControlSpec::default()),
            RawControl::Name(name) => Self::Enabled(ControlSpec::of_kind(ControlKind::parse(&name))),
            RawControl::Spec {
                kind,
                min,
                max,
                step,
            } => Self::Enabled(ControlSpec {
                kind,
                min,
                max,
                step,
            }),
        })
    }
}

/// The `type` entry of an arg type: either a bare type name or
/// `{name, required}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeInfo {
    pub name: Option<String>,
    pub required: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeInfo {
    Name(String),
    Spec {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        required: bool,
    },
}

impl<'de> Deserialize<'de> for TypeInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawTypeInfo::deserialize(deserializer)? {
            RawTypeInfo::Name(name) => Self {
                name: Some(name),
                required: false,
            },
            RawTypeInfo::Spec { name, required } => Self { name, required },
        })
    }
}

/// A story's `argTypes` in declaration order.
pub type ArgTypes = IndexMap<String, ArgType>;

/// One entry of a story's `argTypes` map, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArgType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub type_info: Option<TypeInfo>,
    #[serde(default)]
    pub control: Option<Control>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
}

/// Normalized view of one prop of a component's input surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropDescriptor {
    pub name: String,
    pub control: Option<Control>,
    pub options: Option<Vec<Value>>,
    pub type_name: Option<String>,
    pub required: bool,
    pub description: Option<String>,
}

impl PropDescriptor {
    pub fn from_arg_type(name: &str, arg_type: &ArgType) -> Self {
        let type_info = arg_type.type_info.clone().unwrap_or_default();
        Self {
            name: arg_type.name.clone().unwrap_or_else(|| name.to_string()),
            control: arg_type.control.clone(),
            options: arg_type.options.clone(),
            type_name: type_info.name,
            required: type_info.required,
            description: arg_type.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropShape {
    String,
    DateTime,
    Number {
        minimum: Option<Number>,
        maximum: Option<Number>,
    },
    Boolean,
    /// Array of strings, optionally limited to the given literals.
    StringArray {
        options: Option<Vec<Value>>,
    },
    Array,
    Object {
        open: bool,
    },
    /// Literal choice. `value_type` is set only when every option shares it.
    Enum {
        value_type: Option<JsonType>,
        options: Vec<Value>,
    },
    Union(Vec<JsonType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub shape: PropShape,
    pub description: Option<String>,
}

impl SchemaProperty {
    pub fn new(shape: PropShape) -> Self {
        Self {
            shape,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn to_json(&self) -> Value {
        let mut schema = Map::new();
        match &self.shape {
            PropShape::String => {
                schema.insert("type".into(), JsonType::String.as_str().into());
            }
            PropShape::DateTime => {
                schema.insert("type".into(), JsonType::String.as_str().into());
                schema.insert("format".into(), "date-time".into());
            }
            PropShape::Number { minimum, maximum } => {
                schema.insert("type".into(), JsonType::Number.as_str().into());
                if let Some(minimum) = minimum {
                    schema.insert("minimum".into(), Value::Number(minimum.clone()));
                }
                if let Some(maximum) = maximum {
                    schema.insert("maximum".into(), Value::Number(maximum.clone()));
                }
            }
            PropShape::Boolean => {
                schema.insert("type".into(), JsonType::Boolean.as_str().into());
            }
            PropShape::StringArray { options } => {
                let mut items = Map::new();
                items.insert("type".into(), JsonType::String.as_str().into());
                if let Some(options) = options {
                    items.insert("enum".into(), Value::Array(options.clone()));
                }
                schema.insert("type".into(), JsonType::Array.as_str().into());
                schema.insert("items".into(), Value::Object(items));
            }
            PropShape::Array => {
                schema.insert("type".into(), JsonType::Array.as_str().into());
            }
            PropShape::Object { open } => {
                schema.insert("type".into(), JsonType::Object.as_str().into());
                if *open {
                    schema.insert("additionalProperties".into(), Value::Bool(true));
                }
            }
            PropShape::Enum {
                value_type,
                options,
            } => {
                if let Some(value_type) = value_type {
                    schema.insert("type".into(), value_type.as_str().into());
                }
                schema.insert("enum".into(), Value::Array(options.clone()));
            }
            PropShape::Union(types) => {
                let types = types
                    .iter()
                    .map(|kind| Value::from(kind.as_str()))
                    .collect();
                schema.insert("type".into(), Value::Array(types));
            }
        }
        if let Some(description) = &self.description {
            schema.insert("description".into(), description.clone().into());
        }
        Value::Object(schema)
    }
}

impl Serialize for SchemaProperty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Object schema describing every settable prop of one component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsSchema {
    pub properties: IndexMap<String, SchemaProperty>,
    pub required: Vec<String>,
}

impl PropsSchema {
    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), property.to_json()))
            .collect();
        let required = self
            .required
            .iter()
            .map(|name| Value::from(name.as_str()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), JsonType::Object.as_str().into());
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), Value::Array(required));
        Value::Object(schema)
    }
}

impl Serialize for PropsSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
