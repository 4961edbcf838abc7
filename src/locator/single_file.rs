//! Locator over one file on disk.

use std::path::PathBuf;

use crate::error::Error;
use crate::identifier::Identifier;
use crate::located::{Located, PotentiallyLocatedSource};
use crate::locator::SourceLocator;

/// Serves one whole file for any identifier.
///
/// The file is validated up front and read on every hit, so edits between
/// lookups are seen.
#[derive(Debug, Clone)]
pub struct SingleFileSourceLocator {
    /// File served for every identifier.
    path: PathBuf,
}

impl SingleFileSourceLocator {
    /// Serve the file at `path` for every lookup.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLocatorConfiguration` if the path is empty,
    /// does not exist, or is not a regular file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(invalid("file name was empty"));
        }
        if !path.exists() {
            return Err(invalid(&format!("file does not exist: {}", path.display())));
        }
        if !path.is_file() {
            return Err(invalid(&format!("not a file: {}", path.display())));
        }
        Ok(Self { path })
    }
}

impl SourceLocator for SingleFileSourceLocator {
    fn locate(&self, _identifier: &Identifier) -> Result<Option<Located>, Error> {
        let located = PotentiallyLocatedSource::new(&self.path).into_definite()?;
        Ok(Some(located.into()))
    }

    fn label(&self) -> &'static str {
        "single_file"
    }
}

/// Construction-time rejection.
fn invalid(reason: &str) -> Error {
    Error::InvalidLocatorConfiguration {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(
            SingleFileSourceLocator::new(""),
            Err(Error::InvalidLocatorConfiguration { .. })
        ));
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = SingleFileSourceLocator::new(dir.path().join("nope.php"));
        assert!(matches!(result, Err(Error::InvalidLocatorConfiguration { ref reason }) if reason.contains("does not exist")));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = SingleFileSourceLocator::new(dir.path());
        assert!(matches!(result, Err(Error::InvalidLocatorConfiguration { ref reason }) if reason.contains("not a file")));
    }

    #[test]
    fn serves_file_contents_with_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpers.php");
        std::fs::write(&path, "<?php function helper() {}").unwrap();

        let locator = SingleFileSourceLocator::new(&path).unwrap();
        let source = locator
            .locate(&Identifier::function("helper"))
            .unwrap()
            .unwrap()
            .into_definite()
            .unwrap();
        assert_eq!(source.text(), "<?php function helper() {}");
        assert_eq!(source.origin(), Some(path.as_path()));
    }

    #[test]
    fn file_removed_after_construction_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.php");
        std::fs::write(&path, "<?php").unwrap();
        let locator = SingleFileSourceLocator::new(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            locator.locate(&Identifier::class("Foo")),
            Err(Error::Io { .. })
        ));
    }
}
