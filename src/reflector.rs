//! Lookup service: identifier in, materialized reflection out.

use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::identifier::{Identifier, IdentifierKind};
use crate::locator::SourceLocator;
use crate::reflection::{Reflection, ReflectionClass, ReflectionFunction};
use crate::resolver::Resolver;

/// Ties a locator chain to a resolver.
///
/// Always handled through an `Rc` so descriptors can call back into it
/// (parameter classes, parent classes, declaring classes). Nothing is
/// cached: every call re-locates and re-parses.
pub struct Reflector {
    /// Strategy chain asked for source text.
    locator: Box<dyn SourceLocator>,
    /// Turns located text into descriptors.
    resolver: Resolver,
}

impl Reflector {
    /// A reflector with the default resolver limits.
    pub fn new(locator: Box<dyn SourceLocator>) -> Rc<Self> {
        Self::with_resolver(locator, Resolver::default())
    }

    /// A reflector with custom resolver limits.
    pub fn with_resolver(locator: Box<dyn SourceLocator>, resolver: Resolver) -> Rc<Self> {
        Rc::new(Self { locator, resolver })
    }

    /// The resolver in use.
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Locate, parse and resolve one identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdentifierNotFound` if no locator serves a source
    /// declaring it, or any locator, I/O or parse error on the way.
    pub fn reflect(self: &Rc<Self>, identifier: &Identifier) -> Result<Reflection, Error> {
        self.try_reflect(identifier)?
            .ok_or_else(|| not_found(identifier))
    }

    /// Reflect a class, interface, trait or enum by qualified name.
    ///
    /// # Errors
    ///
    /// As `reflect`.
    pub fn reflect_class(self: &Rc<Self>, name: &str) -> Result<ReflectionClass, Error> {
        let identifier = Identifier::class(name);
        self.reflect(&identifier)?
            .into_class()
            .ok_or_else(|| not_found(&identifier))
    }

    /// Reflect a free function by qualified name.
    ///
    /// # Errors
    ///
    /// As `reflect`.
    pub fn reflect_function(self: &Rc<Self>, name: &str) -> Result<ReflectionFunction, Error> {
        let identifier = Identifier::function(name);
        self.reflect(&identifier)?
            .into_function()
            .ok_or_else(|| not_found(&identifier))
    }

    /// Every declaration of `kind` in the source the chain serves for the
    /// wildcard identifier. Empty when no locator serves one.
    ///
    /// # Errors
    ///
    /// Returns any locator, I/O or parse error.
    pub fn reflect_all(self: &Rc<Self>, kind: IdentifierKind) -> Result<Vec<Reflection>, Error> {
        let identifier = Identifier::wildcard(kind);
        let Some(located) = self.locator.locate(&identifier)? else {
            tracing::debug!(%kind, "no source served for wildcard");
            return Ok(Vec::new());
        };
        let source = Rc::new(located.into_definite()?);
        self.resolver.resolve_all(&source, kind, self)
    }

    /// Whether `reflect` would succeed.
    ///
    /// # Errors
    ///
    /// Returns any error other than a miss.
    pub fn has(self: &Rc<Self>, identifier: &Identifier) -> Result<bool, Error> {
        Ok(self.try_reflect(identifier)?.is_some())
    }

    /// `reflect` with a miss as `Ok(None)`.
    fn try_reflect(self: &Rc<Self>, identifier: &Identifier) -> Result<Option<Reflection>, Error> {
        let Some(located) = self.locator.locate(identifier)? else {
            tracing::debug!(identifier = identifier.name(), kind = %identifier.kind(), "not located");
            return Ok(None);
        };
        let source = Rc::new(located.into_definite()?);
        tracing::trace!(identifier = identifier.name(), origin = %source.origin_label(), "located");
        self.resolver.resolve_one(&source, identifier, self)
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// The miss error for `identifier`.
fn not_found(identifier: &Identifier) -> Error {
    Error::IdentifierNotFound {
        kind: identifier.kind(),
        name: identifier.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{AggregateSourceLocator, StringSourceLocator};

    fn reflector(code: &str) -> Rc<Reflector> {
        Reflector::new(Box::new(StringSourceLocator::new(code).unwrap()))
    }

    #[test]
    fn missing_name_is_not_found() {
        let result = reflector("<?php function foo() {}").reflect_function("bar");
        assert!(matches!(
            result,
            Err(Error::IdentifierNotFound { kind: IdentifierKind::Function, ref name }) if name == "bar"
        ));
    }

    #[test]
    fn empty_aggregate_always_misses() {
        let reflector = Reflector::new(Box::new(AggregateSourceLocator::new()));
        let err = reflector.reflect_class("Foo").err().unwrap();
        assert!(err.is_not_found());
        assert!(reflector.reflect_all(IdentifierKind::Class).unwrap().is_empty());
    }

    #[test]
    fn has_reports_presence_without_error() {
        let reflector = reflector("<?php class Foo {}");
        assert!(reflector.has(&Identifier::class("\\Foo")).unwrap());
        assert!(!reflector.has(&Identifier::class("Bar")).unwrap());
        assert!(!reflector.has(&Identifier::function("Foo")).unwrap());
    }

    #[test]
    fn reflect_all_lists_declarations_in_order() {
        let reflector = reflector("<?php function b() {}\nfunction a() {}\nclass C {}");
        let names: Vec<String> = reflector
            .reflect_all(IdentifierKind::Function)
            .unwrap()
            .iter()
            .map(Reflection::name)
            .collect();
        assert_eq!(names, ["b", "a"]);
    }
}
