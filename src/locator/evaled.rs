//! Locator over class code evaluated at runtime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::identifier::{Identifier, IdentifierKind};
use crate::located::{Located, LocatedSource};
use crate::locator::SourceLocator;

/// Class fragments that were evaluated at runtime and never had a file.
///
/// Cloning shares the same table, so code registered after a locator was
/// built is still found by it.
#[derive(Debug, Clone, Default)]
pub struct EvaledCodeRegistry {
    /// Code keyed by lowercase class name without a leading separator.
    fragments: Rc<RefCell<HashMap<String, String>>>,
}

/// Serves fragments from an `EvaledCodeRegistry`. Functions always miss.
#[derive(Debug, Clone)]
pub struct EvaledCodeSourceLocator {
    /// Shared table consulted on every lookup.
    registry: EvaledCodeRegistry,
}

impl EvaledCodeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the code that declared `class_name`. Usually a bare fragment
    /// without an opening tag, e.g. `class Foo {}`.
    pub fn register(&self, class_name: &str, code: impl Into<String>) {
        self.fragments
            .borrow_mut()
            .insert(normalize(class_name), code.into());
    }

    /// Code registered for `class_name`, case-insensitively.
    pub fn get(&self, class_name: &str) -> Option<String> {
        self.fragments.borrow().get(&normalize(class_name)).cloned()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.fragments.borrow().len()
    }

    /// Nothing registered.
    pub fn is_empty(&self) -> bool {
        self.fragments.borrow().is_empty()
    }
}

impl EvaledCodeSourceLocator {
    /// Serve fragments from `registry`.
    pub const fn new(registry: EvaledCodeRegistry) -> Self {
        Self { registry }
    }
}

impl SourceLocator for EvaledCodeSourceLocator {
    fn locate(&self, identifier: &Identifier) -> Result<Option<Located>, Error> {
        if identifier.kind() != IdentifierKind::Class {
            return Ok(None);
        }
        Ok(self
            .registry
            .get(identifier.name())
            .map(|code| LocatedSource::evaluated(code).into()))
    }

    fn label(&self) -> &'static str {
        "evaled"
    }
}

/// Registry key for a class name.
fn normalize(class_name: &str) -> String {
    class_name.trim_start_matches('\\').to_ascii_lowercase()
}
