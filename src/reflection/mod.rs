//! Materialized, queryable descriptions of resolved declarations.

mod class;
mod function;
mod parameter;

use std::fmt;
use std::rc::Rc;

pub use class::{ClassKind, ReflectionClass};
pub use function::{BodySource, ReflectionFunction, Visibility};
pub use parameter::ReflectionParameter;

use crate::located::LocatedSource;

/// Namespace separator.
pub const SEPARATOR: char = '\\';

/// A resolved class-like or function declaration.
#[derive(Debug)]
pub enum Reflection {
    /// A class, interface, trait or enum.
    Class(ReflectionClass),
    /// A free function.
    Function(ReflectionFunction),
}

/// The namespace a declaration is enclosed in, as ordered segments.
/// Empty means the global namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    /// Outermost first.
    segments: Vec<String>,
}

impl Reflection {
    /// Fully qualified name.
    pub fn name(&self) -> String {
        match self {
            Self::Class(class) => class.name(),
            Self::Function(function) => function.name(),
        }
    }

    /// Name as written in the declaration.
    pub fn short_name(&self) -> &str {
        match self {
            Self::Class(class) => class.short_name(),
            Self::Function(function) => function.short_name(),
        }
    }

    /// Source the declaration was found in.
    pub fn located_source(&self) -> &Rc<LocatedSource> {
        match self {
            Self::Class(class) => class.located_source(),
            Self::Function(function) => function.located_source(),
        }
    }

    /// The class descriptor, if this is one.
    pub fn into_class(self) -> Option<ReflectionClass> {
        match self {
            Self::Class(class) => Some(class),
            Self::Function(_) => None,
        }
    }

    /// The function descriptor, if this is one.
    pub fn into_function(self) -> Option<ReflectionFunction> {
        match self {
            Self::Function(function) => Some(function),
            Self::Class(_) => None,
        }
    }
}

impl Namespace {
    /// The global namespace.
    pub const fn global() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse `A\B` (whitespace and a leading separator are ignored).
    pub fn from_name(name: &str) -> Self {
        let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        Self {
            segments: compact
                .split(SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// No segments.
    pub fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `A\B`, or an empty string for the global namespace.
    pub fn name(&self) -> String {
        self.segments.join("\\")
    }

    /// Prefix a short name with this namespace.
    pub fn qualify(&self, short_name: &str) -> String {
        if self.is_global() {
            return short_name.to_string();
        }
        format!("{}{SEPARATOR}{short_name}", self.name())
    }

    /// Resolve a name written inside this namespace: a leading separator
    /// makes it fully qualified, anything else is relative.
    pub fn resolve(&self, written: &str) -> String {
        written
            .strip_prefix(SEPARATOR)
            .map_or_else(|| self.qualify(written), str::to_string)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_namespace_qualifies_to_short_name() {
        let ns = Namespace::global();
        assert!(ns.is_global());
        assert_eq!(ns.qualify("foo"), "foo");
        assert_eq!(ns.name(), "");
    }

    #[test]
    fn nested_namespace_segments() {
        let ns = Namespace::from_name("A \\ B");
        assert_eq!(ns.segments(), ["A", "B"]);
        assert_eq!(ns.qualify("foo"), "A\\B\\foo");
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let ns = Namespace::from_name("App");
        assert_eq!(ns.resolve("Model\\User"), "App\\Model\\User");
        assert_eq!(ns.resolve("\\DateTime"), "DateTime");
    }
}
