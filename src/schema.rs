use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// Placeholder written for terminal values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Numeric zero, used for every numeric, boolean and char primitive
    Zero,
    /// Empty text, used for string-like types
    EmptyText,
}

/// Example value mirroring the shape of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleValue {
    Null,
    Primitive(Placeholder),
    Array(Vec<ExampleValue>),
    Object(IndexMap<String, ExampleValue>),
}

impl ExampleValue {
    /// Whether the value carries no nested object structure.
    ///
    /// Null, placeholders and arrays of leaves are leaves. Their descriptors
    /// leave the DEFAULT column empty.
    pub fn is_leaf(&self) -> bool {
        match self {
            Self::Null | Self::Primitive(_) => true,
            Self::Array(items) => items.iter().all(ExampleValue::is_leaf),
            Self::Object(_) => false,
        }
    }

    /// Convert to a `serde_json::Value`, preserving object key order
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Primitive(Placeholder::Zero) => serde_json::Value::from(0),
            Self::Primitive(Placeholder::EmptyText) => serde_json::Value::String(String::new()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(ExampleValue::to_json).collect())
            }
            Self::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ExampleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Primitive(Placeholder::Zero) => serializer.serialize_i64(0),
            Self::Primitive(Placeholder::EmptyText) => serializer.serialize_str(""),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(entries) => serializer.collect_map(entries),
        }
    }
}

/// One row of the field table
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Nested example for structured fields, `None` for leaves
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ExampleValue>,
    pub description: String,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        default_value: Option<ExampleValue>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            default_value,
            description: String::new(),
        }
    }

    /// Positional view `(name, type, default, description)` used for table rows
    pub fn to_row(&self) -> [String; 4] {
        let default = self
            .default_value
            .as_ref()
            .map(|value| value.to_json().to_string())
            .unwrap_or_default();
        [
            self.name.clone(),
            self.type_name.clone(),
            default,
            self.description.clone(),
        ]
    }
}

/// Why a field was left out of, or cut short in, a synthesis result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The field's type could not be statically resolved
    Unresolved { raw: String },
    /// The field's type is generic, a collection, or otherwise unmapped
    Unsupported { type_name: String },
    /// The field's type is already being expanded higher up
    Cycle { identity: String },
}

/// A problem scoped to a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted field path relative to the synthesized type
    pub path: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Re-root the issue under a parent field
    pub fn nested_under(mut self, parent: &str) -> Self {
        self.path = if self.path.is_empty() {
            parent.to_string()
        } else {
            format!("{}.{}", parent, self.path)
        };
        self
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Issues raised by a plain ancestor have no field of their own
        let subject = if self.path.is_empty() {
            "inherited fields".to_string()
        } else {
            format!("field `{}`", self.path)
        };

        match &self.kind {
            IssueKind::Unresolved { raw } => {
                write!(f, "{} omitted: unresolved type {}", subject, raw)
            }
            IssueKind::Unsupported { type_name } => {
                write!(f, "{} omitted: unsupported type {}", subject, type_name)
            }
            IssueKind::Cycle { identity } => {
                write!(f, "{} not expanded: {} is already being expanded", subject, identity)
            }
        }
    }
}

/// Example value and flattened field table produced for one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub value: ExampleValue,
    pub fields: Vec<FieldDescriptor>,
    pub issues: Vec<FieldIssue>,
}

impl SynthesisResult {
    /// A result with no fields and no issues
    pub fn terminal(value: ExampleValue) -> Self {
        Self {
            value,
            fields: Vec::new(),
            issues: Vec::new(),
        }
    }
}
