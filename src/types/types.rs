use std::fmt::Display;

use crate::errors::errors::SemanticError;

/// The closed set of type signatures the language knows about.
///
/// `Display` renders the same textual encoding the symbol listing and
/// the intermediate code use: base types by name, arrays as `T[]`,
/// function signatures as `Ret(P1,P2)`, struct registrations as
/// `struct`, and the unknown sentinel as the empty string. `parse` is
/// the inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSig {
    /// Sentinel for an unresolved name or failed check. Compares unequal
    /// to every real type, so later checks cascade instead of crashing.
    Unknown,
    /// The `null` literal; assignable to any reference-like type.
    Null,
    Void,
    Bool,
    Char,
    Int,
    Str,
    Array(Box<TypeSig>),
    /// A struct type referenced by its declared name.
    Named(String),
    /// The registration marker for a struct declaration in the type scope.
    StructDef,
    Function {
        ret: Box<TypeSig>,
        params: Vec<TypeSig>,
    },
}

impl TypeSig {
    pub fn array_of(element: TypeSig) -> Self {
        TypeSig::Array(Box::new(element))
    }

    /// The element type if this is an array signature.
    pub fn element(&self) -> Option<&TypeSig> {
        match self {
            TypeSig::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Strips one level of array, for register-category selection.
    pub fn strip_array(&self) -> &TypeSig {
        self.element().unwrap_or(self)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeSig::Unknown)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeSig::Function { .. })
    }

    /// Parses the textual encoding produced by `Display`.
    ///
    /// The encoding is positional: an outer `(` splits a function
    /// signature into return and parameter types, a trailing `[]` marks
    /// an array, everything else is a base type, `null`, `struct`, the
    /// empty unknown sentinel, or a struct name.
    pub fn parse(text: &str) -> TypeSig {
        if let Some(open) = text.find('(') {
            let ret = TypeSig::parse(&text[..open]);
            let inner = text[open + 1..].trim_end_matches(')');
            let params = if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(TypeSig::parse).collect()
            };
            return TypeSig::Function {
                ret: Box::new(ret),
                params,
            };
        }

        if let Some(element) = text.strip_suffix("[]") {
            return TypeSig::array_of(TypeSig::parse(element));
        }

        match text {
            "" => TypeSig::Unknown,
            "null" => TypeSig::Null,
            "void" => TypeSig::Void,
            "bool" => TypeSig::Bool,
            "char" => TypeSig::Char,
            "int" => TypeSig::Int,
            "string" => TypeSig::Str,
            "struct" => TypeSig::StructDef,
            name => TypeSig::Named(name.to_string()),
        }
    }

    /// Splits a function signature into its component types, return type
    /// first, mirroring the positional `parseSignature` of the string
    /// encoding.
    pub fn signature_parts(&self) -> Result<Vec<TypeSig>, SemanticError> {
        match self {
            TypeSig::Function { ret, params } => {
                let mut parts = Vec::with_capacity(params.len() + 1);
                parts.push((**ret).clone());
                parts.extend(params.iter().cloned());
                Ok(parts)
            }
            other => Err(SemanticError::NotAFunctionSignature {
                signature: other.to_string(),
            }),
        }
    }
}

impl Display for TypeSig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSig::Unknown => Ok(()),
            TypeSig::Null => write!(f, "null"),
            TypeSig::Void => write!(f, "void"),
            TypeSig::Bool => write!(f, "bool"),
            TypeSig::Char => write!(f, "char"),
            TypeSig::Int => write!(f, "int"),
            TypeSig::Str => write!(f, "string"),
            TypeSig::Array(element) => write!(f, "{}[]", element),
            TypeSig::Named(name) => write!(f, "{}", name),
            TypeSig::StructDef => write!(f, "struct"),
            TypeSig::Function { ret, params } => {
                write!(f, "{}(", ret)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
        }
    }
}
