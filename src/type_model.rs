//! Type-capability model consumed by the schema synthesizer.
//!
//! A [`TypeHandle`] is a statically resolved type, detached from whatever parser produced it.
//! Structured types are described by [`TypeDeclaration`]s which the synthesizer looks up
//! through the [`TypeLookup`] trait, so fixtures can be built by hand with a [`TypeCatalog`].

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identity of the universal root type. It never contributes fields.
pub const ROOT_IDENTITY: &str = "serde_json::Value";

/// Identities always treated as opaque strings.
pub const STRING_IDENTITIES: &[&str] = &["alloc::string::String", "str"];

/// A statically resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHandle {
    /// A primitive scalar (numeric, boolean or char)
    Primitive(PrimitiveType),
    /// A fixed-size array or slice of the component type
    Array(Box<TypeHandle>),
    /// A nominal type: the root, a string-like type or a structured type
    Reference {
        /// Fully-qualified name used for lookups
        identity: String,
        /// Display name
        name: String,
    },
    /// A generic instantiation such as `Option<T>` or `Vec<T>`
    Parameterized {
        base: String,
        arguments: Vec<TypeHandle>,
    },
    /// A type shape with no documentation mapping
    Unsupported(String),
}

/// Primitive scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    Char,
}

impl PrimitiveType {
    /// Parse a primitive type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i8" => Some(Self::I8),
            "i16" => Some(Self::I16),
            "i32" => Some(Self::I32),
            "i64" => Some(Self::I64),
            "i128" => Some(Self::I128),
            "isize" => Some(Self::Isize),
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "u128" => Some(Self::U128),
            "usize" => Some(Self::Usize),
            "f32" => Some(Self::F32),
            "f64" => Some(Self::F64),
            "bool" => Some(Self::Bool),
            "char" => Some(Self::Char),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Char => "char",
        }
    }
}

impl TypeHandle {
    /// Create a reference handle
    pub fn reference(identity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Reference {
            identity: identity.into(),
            name: name.into(),
        }
    }

    /// Handle for the universal root type
    pub fn root() -> Self {
        Self::reference(ROOT_IDENTITY, "Value")
    }

    /// Handle for `String`
    pub fn string() -> Self {
        Self::reference(STRING_IDENTITIES[0], "String")
    }

    /// Create an array handle over `component`
    pub fn array(component: TypeHandle) -> Self {
        Self::Array(Box::new(component))
    }

    /// Canonical display name, as shown in the TYPE column
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(primitive) => primitive.name().to_string(),
            Self::Array(component) => format!("{}[]", component.describe()),
            Self::Reference { name, .. } => name.clone(),
            Self::Parameterized { base, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(TypeHandle::describe).collect();
                format!("{}<{}>", base, arguments.join(", "))
            }
            Self::Unsupported(raw) => raw.clone(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    /// Component type of an array handle
    pub fn component_type(&self) -> Option<&TypeHandle> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Identity of a reference handle
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Reference { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Declaration of a structured reference type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Fully-qualified name
    pub identity: String,
    /// Display name
    pub name: String,
    /// Direct ancestors, least-derived contribution first
    pub ancestors: Vec<Ancestor>,
    /// Own fields in declaration order, inherited fields excluded
    pub fields: Vec<FieldDeclaration>,
}

impl TypeDeclaration {
    pub fn new(identity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
            ancestors: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append a direct ancestor
    pub fn with_ancestor(mut self, ancestor: TypeHandle) -> Self {
        self.ancestors.push(Ancestor::new(ancestor));
        self
    }

    /// Append a resolved field
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeHandle) -> Self {
        self.fields.push(FieldDeclaration::resolved(name, ty));
        self
    }

    /// Handle referring to this declaration
    pub fn handle(&self) -> TypeHandle {
        TypeHandle::reference(self.identity.clone(), self.name.clone())
    }
}

/// A type whose fields are inlined ahead of the declaring type's own fields.
///
/// In Rust sources this is a `#[serde(flatten)]` field; `via_field` then names that field so
/// problems with the ancestor can be reported against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub via_field: Option<String>,
    /// The type as written in source
    pub raw_type: String,
    /// `None` when the type failed static resolution
    pub ty: Option<TypeHandle>,
}

impl Ancestor {
    pub fn new(ty: TypeHandle) -> Self {
        Self {
            via_field: None,
            raw_type: ty.describe(),
            ty: Some(ty),
        }
    }

    /// Ancestor contributed by a flattened field
    pub fn flattened(
        field: impl Into<String>,
        raw_type: impl Into<String>,
        ty: Option<TypeHandle>,
    ) -> Self {
        Self {
            via_field: Some(field.into()),
            raw_type: raw_type.into(),
            ty,
        }
    }

    /// Path that issues raised by this ancestor are reported under
    pub fn issue_path(&self) -> &str {
        self.via_field.as_deref().unwrap_or("")
    }
}

/// A declared field. `ty` is `None` when the field's type failed static resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub name: String,
    /// The type as written in source
    pub raw_type: String,
    pub ty: Option<TypeHandle>,
}

impl FieldDeclaration {
    pub fn resolved(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self {
            name: name.into(),
            raw_type: ty.describe(),
            ty: Some(ty),
        }
    }

    pub fn unresolved(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            ty: None,
        }
    }
}

/// Capability used by the synthesizer to inspect reference types.
pub trait TypeLookup {
    /// Declaration of a structured type, if known
    fn declaration(&self, identity: &str) -> Option<&TypeDeclaration>;

    /// Whether `identity` is the universal root type
    fn is_root(&self, identity: &str) -> bool {
        identity == ROOT_IDENTITY
    }

    /// Whether `identity` is an opaque string-like type
    fn is_string_like(&self, identity: &str) -> bool {
        STRING_IDENTITIES.contains(&identity)
    }
}

/// In-memory [`TypeLookup`] keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    declarations: HashMap<String, TypeDeclaration>,
    string_like: HashSet<String>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, replacing any previous one with the same identity
    pub fn insert(&mut self, declaration: TypeDeclaration) {
        self.declarations
            .insert(declaration.identity.clone(), declaration);
    }

    /// Register an extra identity to be treated as an opaque string
    pub fn add_string_like(&mut self, identity: impl Into<String>) {
        self.string_like.insert(identity.into());
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl TypeLookup for TypeCatalog {
    fn declaration(&self, identity: &str) -> Option<&TypeDeclaration> {
        self.declarations.get(identity)
    }

    fn is_string_like(&self, identity: &str) -> bool {
        STRING_IDENTITIES.contains(&identity) || self.string_like.contains(identity)
    }
}
