use crate::schema::IssueKind;

/// Result type alias for schema synthesis
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Reasons a type cannot be synthesized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// A reference type with no known declaration
    Unresolved(String),
    /// Generic, collection or otherwise unmapped type shape
    Unsupported(String),
}

impl std::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SynthesisError::Unresolved(identity) => write!(f, "unresolved type: {}", identity),
            SynthesisError::Unsupported(type_name) => {
                write!(f, "unsupported type shape: {}", type_name)
            }
        }
    }
}

impl std::error::Error for SynthesisError {}

impl From<SynthesisError> for IssueKind {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Unresolved(raw) => IssueKind::Unresolved { raw },
            SynthesisError::Unsupported(type_name) => IssueKind::Unsupported { type_name },
        }
    }
}
