// AST data structures for Tributary.
// These types represent the declarations of one parsed C++ translation unit,
// in a form suitable for record discovery and field classification.

use std::fmt;
use std::path::{Path, PathBuf};

/// The parsed output for one input file.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
}

impl TranslationUnit {
    pub fn new(path: impl Into<PathBuf>, declarations: Vec<Declaration>) -> Self {
        Self {
            path: path.into(),
            declarations,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 1-based position of a declaration in its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A node in the declaration tree.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Empty for anonymous namespaces and records.
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Nested declarations, in source order.
    pub children: Vec<Declaration>,
    pub location: SourceLocation,
}

impl Declaration {
    pub fn new(kind: DeclKind, name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            location,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_children(mut self, children: Vec<Declaration>) -> Self {
        self.children = children;
        self
    }

    /// Name for display; anonymous declarations render as `<anonymous>`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<anonymous>"
        } else {
            &self.name
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, DeclKind::Record { .. })
    }

    /// The reflect-marker attribute, if this declaration carries one.
    pub fn reflect_marker(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_reflect_marker())
    }

    /// Non-static data members, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Declaration> {
        self.children
            .iter()
            .filter(|c| matches!(c.kind, DeclKind::Field { .. }))
    }
}

/// Supported declaration kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Namespace,
    Record {
        keyword: RecordKeyword,
        is_definition: bool,
        is_template: bool,
    },
    /// Non-static data member.
    Field { ty: TypeRef, access: Access },
    /// Namespace-scope variable or static data member.
    Variable { ty: TypeRef },
    Enum { is_definition: bool },
    Alias { target: TypeRef },
    Function { is_template: bool },
}

impl DeclKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeclKind::Namespace => "namespace",
            DeclKind::Record { is_template: true, .. } => "class template",
            DeclKind::Record { keyword, .. } => keyword.as_str(),
            DeclKind::Field { .. } => "member variable",
            DeclKind::Variable { .. } => "variable",
            DeclKind::Enum { .. } => "enum",
            DeclKind::Alias { .. } => "type alias",
            DeclKind::Function { is_template: true } => "function template",
            DeclKind::Function { .. } => "function",
        }
    }

    /// Containers own nested declarations worth walking.
    pub fn is_container(&self) -> bool {
        matches!(self, DeclKind::Namespace | DeclKind::Record { .. })
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKeyword {
    Struct,
    Class,
    Union,
}

impl RecordKeyword {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "struct" => Some(RecordKeyword::Struct),
            "class" => Some(RecordKeyword::Class),
            "union" => Some(RecordKeyword::Union),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKeyword::Struct => "struct",
            RecordKeyword::Class => "class",
            RecordKeyword::Union => "union",
        }
    }

    /// Access in effect before the first access specifier.
    pub fn default_access(&self) -> Access {
        match self {
            RecordKeyword::Class => Access::Private,
            _ => Access::Public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }
}

/// Attribute marker kinds, resolved once when the tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// `legion::reflectable` or `rythe::reflectable`.
    Reflectable,
    Other { scope: Option<String>, name: String },
}

/// Scopes under which `reflectable` opts a declaration into generation.
pub const REFLECT_SCOPES: &[&str] = &["legion", "rythe"];
pub const REFLECT_NAME: &str = "reflectable";

/// A `[[scope::name("argument")]]` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub kind: AttributeKind,
    /// Contents of a single string-literal argument, unescaped.
    pub argument: Option<String>,
}

impl Attribute {
    pub fn resolve(scope: Option<&str>, name: &str, argument: Option<String>) -> Self {
        let kind = match scope {
            Some(s) if name == REFLECT_NAME && REFLECT_SCOPES.contains(&s) => {
                AttributeKind::Reflectable
            }
            _ => AttributeKind::Other {
                scope: scope.map(str::to_string),
                name: name.to_string(),
            },
        };
        Self { kind, argument }
    }

    pub fn reflectable(argument: Option<&str>) -> Self {
        Self {
            kind: AttributeKind::Reflectable,
            argument: argument.map(str::to_string),
        }
    }

    pub fn is_reflect_marker(&self) -> bool {
        self.kind == AttributeKind::Reflectable
    }
}

/// Builtin (fundamental) C++ types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    WChar,
    Char8,
    Char16,
    Char32,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    Nullptr,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 21] = [
        BuiltinType::Void,
        BuiltinType::Bool,
        BuiltinType::Char,
        BuiltinType::SignedChar,
        BuiltinType::UnsignedChar,
        BuiltinType::WChar,
        BuiltinType::Char8,
        BuiltinType::Char16,
        BuiltinType::Char32,
        BuiltinType::Short,
        BuiltinType::UnsignedShort,
        BuiltinType::Int,
        BuiltinType::UnsignedInt,
        BuiltinType::Long,
        BuiltinType::UnsignedLong,
        BuiltinType::LongLong,
        BuiltinType::UnsignedLongLong,
        BuiltinType::Float,
        BuiltinType::Double,
        BuiltinType::LongDouble,
        BuiltinType::Nullptr,
    ];

    /// Character types whose pointers are treated as C strings.
    pub fn is_string_character(&self) -> bool {
        matches!(
            self,
            BuiltinType::Char | BuiltinType::WChar | BuiltinType::Char16 | BuiltinType::Char32
        )
    }

    pub fn spelling(&self) -> &'static str {
        match self {
            BuiltinType::Void => "void",
            BuiltinType::Bool => "bool",
            BuiltinType::Char => "char",
            BuiltinType::SignedChar => "signed char",
            BuiltinType::UnsignedChar => "unsigned char",
            BuiltinType::WChar => "wchar_t",
            BuiltinType::Char8 => "char8_t",
            BuiltinType::Char16 => "char16_t",
            BuiltinType::Char32 => "char32_t",
            BuiltinType::Short => "short",
            BuiltinType::UnsignedShort => "unsigned short",
            BuiltinType::Int => "int",
            BuiltinType::UnsignedInt => "unsigned int",
            BuiltinType::Long => "long",
            BuiltinType::UnsignedLong => "unsigned long",
            BuiltinType::LongLong => "long long",
            BuiltinType::UnsignedLongLong => "unsigned long long",
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::LongDouble => "long double",
            BuiltinType::Nullptr => "std::nullptr_t",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CvQualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl CvQualifiers {
    pub fn is_empty(&self) -> bool {
        !self.is_const && !self.is_volatile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Lvalue,
    Rvalue,
}

/// A declared type as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Builtin(BuiltinType),
    /// Reference to a named type defined elsewhere (record, enum, alias).
    Named(String),
    Qualified { inner: Box<TypeRef>, cv: CvQualifiers },
    Pointer(Box<TypeRef>),
    Reference { inner: Box<TypeRef>, kind: ReferenceKind },
    Array { element: Box<TypeRef>, size: Option<String> },
    TemplateInstance { template: String, arguments: String },
    /// Anything the front end does not model (function pointers, decltype).
    Unexposed(String),
}

impl TypeRef {
    pub fn pointer_to(inner: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(inner))
    }

    pub fn qualified(inner: TypeRef, cv: CvQualifiers) -> Self {
        if cv.is_empty() {
            return inner;
        }
        match inner {
            TypeRef::Qualified { inner, cv: existing } => TypeRef::Qualified {
                inner,
                cv: CvQualifiers {
                    is_const: cv.is_const || existing.is_const,
                    is_volatile: cv.is_volatile || existing.is_volatile,
                },
            },
            other => TypeRef::Qualified {
                inner: Box::new(other),
                cv,
            },
        }
    }

    pub fn constant(inner: TypeRef) -> Self {
        Self::qualified(
            inner,
            CvQualifiers {
                is_const: true,
                is_volatile: false,
            },
        )
    }

    /// The type with top-level const/volatile removed.
    pub fn strip_cv(&self) -> &TypeRef {
        match self {
            TypeRef::Qualified { inner, .. } => inner.strip_cv(),
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Builtin(b) => f.write_str(b.spelling()),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Qualified { inner, cv } => {
                if cv.is_const {
                    f.write_str("const ")?;
                }
                if cv.is_volatile {
                    f.write_str("volatile ")?;
                }
                write!(f, "{}", inner)
            }
            TypeRef::Pointer(inner) => write!(f, "{}*", inner),
            TypeRef::Reference { inner, kind } => match kind {
                ReferenceKind::Lvalue => write!(f, "{}&", inner),
                ReferenceKind::Rvalue => write!(f, "{}&&", inner),
            },
            TypeRef::Array { element, size } => {
                write!(f, "{}[{}]", element, size.as_deref().unwrap_or(""))
            }
            TypeRef::TemplateInstance {
                template,
                arguments,
            } => write!(f, "{}<{}>", template, arguments),
            TypeRef::Unexposed(spelling) => f.write_str(spelling),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_marker_scopes() {
        assert!(Attribute::resolve(Some("legion"), "reflectable", None).is_reflect_marker());
        assert!(Attribute::resolve(Some("rythe"), "reflectable", None).is_reflect_marker());
        assert!(!Attribute::resolve(None, "reflectable", None).is_reflect_marker());
        assert!(!Attribute::resolve(Some("legion"), "serializable", None).is_reflect_marker());
    }

    #[test]
    fn test_strip_cv_nested() {
        let ty = TypeRef::constant(TypeRef::qualified(
            TypeRef::Builtin(BuiltinType::Int),
            CvQualifiers {
                is_const: false,
                is_volatile: true,
            },
        ));
        assert_eq!(ty.strip_cv(), &TypeRef::Builtin(BuiltinType::Int));
        assert_eq!(ty.to_string(), "const volatile int");
    }

    #[test]
    fn test_fields_skip_non_members() {
        let loc = SourceLocation::default();
        let record = Declaration::new(
            DeclKind::Record {
                keyword: RecordKeyword::Struct,
                is_definition: true,
                is_template: false,
            },
            "s",
            loc,
        )
        .with_children(vec![
            Declaration::new(
                DeclKind::Field {
                    ty: TypeRef::Builtin(BuiltinType::Int),
                    access: Access::Public,
                },
                "a",
                loc,
            ),
            Declaration::new(DeclKind::Function { is_template: false }, "f", loc),
            Declaration::new(
                DeclKind::Variable {
                    ty: TypeRef::Builtin(BuiltinType::Int),
                },
                "count",
                loc,
            ),
        ]);
        let names: Vec<&str> = record.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
