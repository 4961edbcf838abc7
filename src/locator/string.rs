//! Locator over a single in-memory text.

use crate::error::Error;
use crate::identifier::Identifier;
use crate::located::{Located, LocatedSource};
use crate::locator::SourceLocator;

/// Serves one in-memory text for any identifier.
#[derive(Debug, Clone)]
pub struct StringSourceLocator {
    /// The text served for every identifier.
    source: String,
}

impl StringSourceLocator {
    /// Serve `source` for every lookup.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLocatorConfiguration` if `source` is empty.
    pub fn new(source: impl Into<String>) -> Result<Self, Error> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(Error::InvalidLocatorConfiguration {
                reason: "source code string was empty".to_string(),
            });
        }
        Ok(Self { source })
    }
}

impl SourceLocator for StringSourceLocator {
    fn locate(&self, _identifier: &Identifier) -> Result<Option<Located>, Error> {
        Ok(Some(LocatedSource::evaluated(self.source.clone()).into()))
    }

    fn label(&self) -> &'static str {
        "string"
    }
}
