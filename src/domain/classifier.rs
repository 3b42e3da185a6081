//! Member classification.
//!
//! Decides, per data member of a candidate record, how its line of generated
//! code is produced. An explicit override on the field always wins; after
//! that the declared type is inspected from the simplest case (builtin) to
//! the most specific one (C string) before the member is rejected.

use std::fmt;

use crate::domain::ast::{BuiltinType, DeclKind, Declaration, TypeRef};

/// Type classification with cv-qualification stripped at every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Builtin(BuiltinType),
    UserDefined(String),
    Pointer(Box<FieldType>),
    Other,
}

impl FieldType {
    pub fn of(ty: &TypeRef) -> Self {
        match ty.strip_cv() {
            TypeRef::Builtin(b) => FieldType::Builtin(*b),
            TypeRef::Named(name) => FieldType::UserDefined(name.clone()),
            TypeRef::Pointer(pointee) => FieldType::Pointer(Box::new(FieldType::of(pointee))),
            _ => FieldType::Other,
        }
    }

    /// Pointer to a narrow, wide, UTF-16 or UTF-32 character.
    pub fn is_c_string(&self) -> bool {
        match self {
            FieldType::Pointer(pointee) => {
                matches!(**pointee, FieldType::Builtin(b) if b.is_string_character())
            }
            _ => false,
        }
    }
}

/// Why a name-only line was chosen. All paths render the same today; the
/// C-string path is kept apart for string-specific serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePath {
    Builtin,
    UserDefined,
    CString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStrategy {
    EmitAttributeLiteral(String),
    EmitNameOnly(NamePath),
    Reject(Rejection),
}

/// A member the generator cannot serialize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot serialize member {member}")]
pub struct Rejection {
    pub member: String,
    pub declared_type: String,
}

/// A strategy that survived classification; it can always be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitStrategy {
    Literal(String),
    NameOnly(NamePath),
}

impl TryFrom<GenerationStrategy> for EmitStrategy {
    type Error = Rejection;

    fn try_from(strategy: GenerationStrategy) -> Result<Self, Self::Error> {
        match strategy {
            GenerationStrategy::EmitAttributeLiteral(text) => Ok(EmitStrategy::Literal(text)),
            GenerationStrategy::EmitNameOnly(path) => Ok(EmitStrategy::NameOnly(path)),
            GenerationStrategy::Reject(rejection) => Err(rejection),
        }
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStrategy::EmitAttributeLiteral(text) => write!(f, "literal `{}`", text),
            GenerationStrategy::EmitNameOnly(path) => write!(f, "name-only ({:?})", path),
            GenerationStrategy::Reject(r) => write!(f, "reject ({})", r),
        }
    }
}

/// Classify one data member. Declarations that are not data members are
/// rejected: they have no type to serialize.
pub fn classify(field: &Declaration) -> GenerationStrategy {
    if let Some(text) = field.reflect_marker().and_then(|a| a.argument.as_ref()) {
        return GenerationStrategy::EmitAttributeLiteral(text.clone());
    }

    let ty = match &field.kind {
        DeclKind::Field { ty, .. } | DeclKind::Variable { ty } => ty,
        other => {
            return GenerationStrategy::Reject(Rejection {
                member: field.display_name().to_string(),
                declared_type: other.label().to_string(),
            })
        }
    };

    let field_type = FieldType::of(ty);
    match field_type {
        FieldType::Builtin(_) => GenerationStrategy::EmitNameOnly(NamePath::Builtin),
        FieldType::UserDefined(_) => GenerationStrategy::EmitNameOnly(NamePath::UserDefined),
        ref pointer if pointer.is_c_string() => GenerationStrategy::EmitNameOnly(NamePath::CString),
        _ => GenerationStrategy::Reject(Rejection {
            member: field.display_name().to_string(),
            declared_type: ty.to_string(),
        }),
    }
}
