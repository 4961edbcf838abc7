//! Strategies that find the raw text declaring an identifier.
//!
//! A locator never reads more than it must and never turns a miss into an
//! error: `Ok(None)` is the only way to say "not here". `Err` is kept for
//! infrastructure failures, and construction-time misuse is rejected in the
//! constructor with `Error::InvalidLocatorConfiguration`.

mod class_map;
mod evaled;
mod internal;
mod single_file;
mod string;

pub use class_map::{ClassLoader, ClassMap, ClassMapSourceLocator, Psr4Loader};
pub use evaled::{EvaledCodeRegistry, EvaledCodeSourceLocator};
pub use internal::InternalSourceLocator;
pub use single_file::SingleFileSourceLocator;
pub use string::StringSourceLocator;

use crate::error::Error;
use crate::identifier::Identifier;
use crate::located::Located;

/// One way of finding source text for an identifier.
pub trait SourceLocator {
    /// Find the source declaring `identifier`, or `Ok(None)` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures, such as I/O on a
    /// file that must exist.
    fn locate(&self, identifier: &Identifier) -> Result<Option<Located>, Error>;

    /// Short label for logs.
    fn label(&self) -> &'static str;
}

/// Tries its strategies in order and returns the first hit.
#[derive(Default)]
pub struct AggregateSourceLocator {
    /// Strategies in the order they are tried.
    locators: Vec<Box<dyn SourceLocator>>,
}

impl AggregateSourceLocator {
    /// An empty chain, which misses every identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy, tried after the existing ones.
    pub fn push(&mut self, locator: Box<dyn SourceLocator>) {
        self.locators.push(locator);
    }

    /// Builder form of `push`.
    #[must_use]
    pub fn with(mut self, locator: impl SourceLocator + 'static) -> Self {
        self.push(Box::new(locator));
        self
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// No strategies, so every lookup misses.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Labels of the strategies in the order they are tried.
    pub fn labels(&self) -> Vec<&'static str> {
        self.locators.iter().map(|l| l.label()).collect()
    }
}

impl SourceLocator for AggregateSourceLocator {
    fn locate(&self, identifier: &Identifier) -> Result<Option<Located>, Error> {
        for locator in &self.locators {
            if let Some(located) = locator.locate(identifier)? {
                tracing::debug!(
                    identifier = identifier.name(),
                    locator = locator.label(),
                    "located"
                );
                return Ok(Some(located));
            }
            tracing::trace!(identifier = identifier.name(), locator = locator.label(), "missed");
        }
        Ok(None)
    }

    fn label(&self) -> &'static str {
        "aggregate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_misses() {
        let aggregate = AggregateSourceLocator::new();
        assert!(aggregate.is_empty());
        assert!(aggregate.locate(&Identifier::class("Foo")).unwrap().is_none());
    }

    #[test]
    fn first_hit_wins() {
        let registry = EvaledCodeRegistry::new();
        registry.register("Foo", "class Foo {}");
        let aggregate = AggregateSourceLocator::new()
            .with(EvaledCodeSourceLocator::new(registry))
            .with(StringSourceLocator::new("<?php class Foo { function fromString() {} }").unwrap());

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.labels(), ["evaled", "string"]);

        let located = aggregate.locate(&Identifier::class("Foo")).unwrap().unwrap();
        let source = located.into_definite().unwrap();
        assert_eq!(source.text(), "class Foo {}");

        // The evaled registry misses functions; the string locator serves them.
        let located = aggregate.locate(&Identifier::function("bar")).unwrap().unwrap();
        assert!(located.into_definite().unwrap().text().contains("fromString"));
    }
}
