//! Go type expressions.

use core::fmt;

use super::StructType;

/// A Go type expression as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A named type, optionally package-qualified (`string`, `time.Time`).
    Named {
        /// Package qualifier.
        package: Option<String>,
        /// Type name.
        name: String,
    },
    /// Pointer type (`*T`).
    Pointer(Box<TypeExpr>),
    /// Slice type (`[]T`).
    Slice(Box<TypeExpr>),
    /// Array type (`[N]T`). The length is kept verbatim.
    Array {
        /// Length expression.
        len: String,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// Map type (`map[K]V`).
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// Channel type (`chan T`).
    Chan(Box<TypeExpr>),
    /// Function type. Signatures are not modelled.
    Func,
    /// Interface type. Method sets are not modelled.
    Interface {
        /// Whether the interface declares no methods.
        empty: bool,
    },
    /// Inline struct type.
    Struct(StructType),
}

impl TypeExpr {
    /// Creates an unqualified named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
        }
    }

    /// Creates a package-qualified named type.
    #[must_use]
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            package: Some(package.into()),
            name: name.into(),
        }
    }

    /// Returns true if this is a struct type.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }
}

impl fmt::Display for TypeExpr {
    /// Renders the type the way model metadata stores it. Arrays render
    /// as slices (`[]T`), matching how declared types are compared.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                package: Some(package),
                name,
            } => write!(f, "{package}.{name}"),
            Self::Named {
                package: None,
                name,
            } => write!(f, "{name}"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(elem) | Self::Array { elem, .. } => write!(f, "[]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Chan(elem) => write!(f, "chan {elem}"),
            Self::Func => write!(f, "func()"),
            Self::Interface { empty: true } => write!(f, "interface{{}}"),
            Self::Interface { empty: false } => write!(f, "interface{{...}}"),
            Self::Struct(_) => write!(f, "struct{{...}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_named() {
        assert_eq!(TypeExpr::named("string").to_string(), "string");
        assert_eq!(TypeExpr::qualified("time", "Time").to_string(), "time.Time");
    }

    #[test]
    fn test_display_composite() {
        let ptr = TypeExpr::Pointer(Box::new(TypeExpr::qualified("time", "Time")));
        assert_eq!(ptr.to_string(), "*time.Time");

        let bytes = TypeExpr::Slice(Box::new(TypeExpr::named("byte")));
        assert_eq!(bytes.to_string(), "[]byte");

        let array = TypeExpr::Array {
            len: "16".into(),
            elem: Box::new(TypeExpr::named("byte")),
        };
        assert_eq!(array.to_string(), "[]byte");

        let map = TypeExpr::Map {
            key: Box::new(TypeExpr::named("string")),
            value: Box::new(TypeExpr::Interface { empty: true }),
        };
        assert_eq!(map.to_string(), "map[string]interface{}");
    }
}
