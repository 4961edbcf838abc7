//! Query keys: what is being looked for, and of which kind.

use std::fmt;

use crate::reflection::Reflection;

/// Name used by `Reflector::reflect_all` to ask locators for everything they serve.
pub const WILDCARD: &str = "*";

/// The syntactic shape of a top-level declaration found in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `class`, `interface`, `trait` or `enum`.
    ClassLike,
    /// A free `function`.
    Function,
}

/// A (name, kind) query key for locating a declaration.
///
/// A leading `\` is dropped on construction, so `\A\foo` and `A\foo` are
/// the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Which declarations may match.
    kind: IdentifierKind,
    /// Qualified name without a leading separator, or `*`.
    name: String,
}

/// Which declarations an identifier can match.
///
/// Methods are looked up through a class's own index, never through this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// Classes, interfaces, traits and enums.
    Class,
    /// Free functions.
    Function,
}

impl Identifier {
    /// Build an identifier, normalizing away a leading namespace separator.
    pub fn new(name: impl AsRef<str>, kind: IdentifierKind) -> Self {
        Self {
            kind,
            name: name.as_ref().trim_start_matches('\\').to_string(),
        }
    }

    /// Shorthand for a class identifier.
    pub fn class(name: impl AsRef<str>) -> Self {
        Self::new(name, IdentifierKind::Class)
    }

    /// Shorthand for a function identifier.
    pub fn function(name: impl AsRef<str>) -> Self {
        Self::new(name, IdentifierKind::Function)
    }

    /// The "everything of this kind" identifier.
    pub fn wildcard(kind: IdentifierKind) -> Self {
        Self {
            kind,
            name: WILDCARD.to_string(),
        }
    }

    /// Which declarations may match.
    pub const fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Qualified name as requested.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks for every declaration of its kind.
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// PHP class and function names are case-insensitive.
    pub fn matches_name(&self, qualified_name: &str) -> bool {
        self.name
            .eq_ignore_ascii_case(qualified_name.trim_start_matches('\\'))
    }
}

impl IdentifierKind {
    /// Does a syntactic declaration of `kind` belong to this identifier kind?
    pub const fn matches_declaration(self, kind: DeclarationKind) -> bool {
        matches!(
            (self, kind),
            (Self::Class, DeclarationKind::ClassLike) | (Self::Function, DeclarationKind::Function)
        )
    }

    /// Does an already-materialized descriptor have this kind's capability?
    pub fn matches(self, reflection: &Reflection) -> bool {
        matches!(
            (self, reflection),
            (Self::Class, Reflection::Class(_)) | (Self::Function, Reflection::Function(_))
        )
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Class => "class",
            Self::Function => "function",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.name)
    }
}
