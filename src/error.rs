use std::fmt;

/// Error raised when the input document cannot be used as a resolution input
///
/// The crate never parses raw bytes; callers hand it an already-parsed JSON
/// value. These errors cover the structural requirements on that value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document root is not a JSON object
    RootNotObject,
    /// A section that must be an object (e.g. `components.schemas`) is not one
    InvalidSection {
        /// Dotted path of the offending section
        section: String,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::RootNotObject => {
                write!(f, "document root must be a JSON object")
            }
            DocumentError::InvalidSection { section } => {
                write!(f, "document section `{}` must be a JSON object", section)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// Error raised during schema or operation resolution
///
/// A dangling `$ref` is always a hard error: silently defaulting would emit a
/// client that compiles against a type that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A `$ref` whose target name is absent from the schema table
    UnresolvedRef {
        /// The full reference path as written in the document
        ref_path: String,
    },
    /// A `$ref` that does not point into a recognized components section
    UnsupportedRef {
        /// The full reference path as written in the document
        ref_path: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnresolvedRef { ref_path } => {
                write!(
                    f,
                    "unresolvable reference `{}`: target is not declared in the schema table",
                    ref_path
                )
            }
            ResolveError::UnsupportedRef { ref_path } => {
                write!(
                    f,
                    "unsupported reference `{}`: only `#/components/schemas/*` and \
                    `#/components/parameters/*` references are recognized",
                    ref_path
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}
