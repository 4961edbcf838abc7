//! Locator over the stubs bundled for built-in declarations.

use crate::error::Error;
use crate::identifier::{Identifier, IdentifierKind};
use crate::located::{Located, LocatedSource};
use crate::locator::SourceLocator;

/// A `Stub` entry embedding a file under `stubs/`.
macro_rules! stub {
    ($kind:ident, $name:literal, $path:literal) => {
        Stub {
            kind: IdentifierKind::$kind,
            name: $name,
            source: include_str!(concat!("../../stubs/", $path)),
        }
    };
}

/// Every bundled stub.
const STUBS: &[Stub] = &[
    stub!(Class, "ArrayAccess", "ArrayAccess.php"),
    stub!(Class, "Closure", "Closure.php"),
    stub!(Class, "Countable", "Countable.php"),
    stub!(Class, "Exception", "Exception.php"),
    stub!(Class, "Generator", "Generator.php"),
    stub!(Class, "Iterator", "Iterator.php"),
    stub!(Class, "IteratorAggregate", "IteratorAggregate.php"),
    stub!(Class, "JsonSerializable", "JsonSerializable.php"),
    stub!(Class, "Stringable", "Stringable.php"),
    stub!(Class, "Throwable", "Throwable.php"),
    stub!(Class, "Traversable", "Traversable.php"),
    stub!(Class, "stdClass", "stdClass.php"),
    stub!(Function, "array_map", "functions/array_map.php"),
    stub!(Function, "count", "functions/count.php"),
    stub!(Function, "iterator_to_array", "functions/iterator_to_array.php"),
    stub!(Function, "sprintf", "functions/sprintf.php"),
    stub!(Function, "str_contains", "functions/str_contains.php"),
    stub!(Function, "strlen", "functions/strlen.php"),
];

/// A bundled declaration standing in for a built-in one.
struct Stub {
    /// Whether the stub declares a class-like or a function.
    kind: IdentifierKind,
    /// Name the stub declares, in its canonical case.
    name: &'static str,
    /// Stub file contents, embedded at build time.
    source: &'static str,
}

/// Serves the bundled stubs for built-in classes and functions. Every
/// source it returns is marked internal.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalSourceLocator;

impl InternalSourceLocator {
    /// The stub locator; it has no state.
    pub const fn new() -> Self {
        Self
    }

    /// Whether a stub of either kind exists for `name`.
    pub fn has_stub(name: &str) -> bool {
        let name = name.trim_start_matches('\\');
        STUBS.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// The stub declaring `identifier`, matched by kind and name.
    fn find(identifier: &Identifier) -> Option<&'static Stub> {
        STUBS
            .iter()
            .find(|s| s.kind == identifier.kind() && identifier.matches_name(s.name))
    }
}

impl SourceLocator for InternalSourceLocator {
    fn locate(&self, identifier: &Identifier) -> Result<Option<Located>, Error> {
        Ok(Self::find(identifier).map(|stub| LocatedSource::internal(stub.source).into()))
    }

    fn label(&self) -> &'static str {
        "internal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;

    #[test]
    fn stub_lookup_ignores_case() {
        assert!(InternalSourceLocator::has_stub("\\stdclass"));
        assert!(InternalSourceLocator::has_stub("STRLEN"));
        assert!(!InternalSourceLocator::has_stub("Foo\\Bar"));

        let locator = InternalSourceLocator::new();

        let source = locator
            .locate(&Identifier::class("iterator"))
            .unwrap()
            .unwrap()
            .into_definite()
            .unwrap();
        assert!(source.is_internal());
        assert_eq!(source.origin(), None);
        assert_eq!(source.origin_label(), "<internal>");
    }

    #[test]
    fn kind_must_match() {
        let locator = InternalSourceLocator::new();
        assert!(locator.locate(&Identifier::function("Countable")).unwrap().is_none());
        assert!(locator.locate(&Identifier::class("count")).unwrap().is_none());
    }

    #[test]
    fn every_stub_parses() {
        for stub in STUBS {
            assert!(
                grammar::parse(stub.source, stub.name).is_ok(),
                "stub {} does not parse",
                stub.name
            );
        }
    }
}
