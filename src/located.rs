//! Raw source text plus origin metadata, before parsing.

use std::path::{Path, PathBuf};

use crate::error::Error;

/// Label used in diagnostics for sources without a file.
const EVALUATED_ORIGIN: &str = "<evaluated>";

/// Label used in diagnostics for bundled stubs.
const INTERNAL_ORIGIN: &str = "<internal>";

/// Source text whose origin is settled. This is the only form the resolver
/// accepts, so every descriptor is built from a fully specified source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    /// Set for bundled stubs standing in for built-in declarations.
    internal: bool,
    /// File the text was read from; `None` for evaluated or internal code.
    origin: Option<PathBuf>,
    /// Full source text.
    text: String,
}

/// A file that probably declares the identifier, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentiallyLocatedSource {
    /// File to read.
    path: PathBuf,
}

/// What a locator hands back on a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Text is in hand.
    Definite(LocatedSource),
    /// Only a path is known; it must be read before resolution.
    Potential(PotentiallyLocatedSource),
}

impl LocatedSource {
    /// User code with an optional file origin.
    pub fn new(text: impl Into<String>, origin: Option<PathBuf>) -> Self {
        Self {
            internal: false,
            origin,
            text: text.into(),
        }
    }

    /// User code that was never in a file.
    pub fn evaluated(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// A bundled stub for a built-in declaration.
    pub fn internal(text: impl Into<String>) -> Self {
        Self {
            internal: true,
            origin: None,
            text: text.into(),
        }
    }

    /// Full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File the text was read from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// A bundled stub standing in for a built-in declaration.
    pub const fn is_internal(&self) -> bool {
        self.internal
    }

    /// File path for diagnostics, or a bracketed label when there is no file.
    pub fn origin_label(&self) -> String {
        match (&self.origin, self.internal) {
            (Some(path), _) => path.display().to_string(),
            (None, true) => INTERNAL_ORIGIN.to_string(),
            (None, false) => EVALUATED_ORIGIN.to_string(),
        }
    }
}

impl PotentiallyLocatedSource {
    /// A file that has not been read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File to read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and settle the source.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read.
    pub fn into_definite(self) -> Result<LocatedSource, Error> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(LocatedSource::new(text, Some(self.path)))
    }
}

impl Located {
    /// Normalize to a definite source, reading the file if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a potential source's file cannot be read.
    pub fn into_definite(self) -> Result<LocatedSource, Error> {
        match self {
            Self::Definite(source) => Ok(source),
            Self::Potential(potential) => potential.into_definite(),
        }
    }
}

impl From<LocatedSource> for Located {
    fn from(source: LocatedSource) -> Self {
        Self::Definite(source)
    }
}

impl From<PotentiallyLocatedSource> for Located {
    fn from(potential: PotentiallyLocatedSource) -> Self {
        Self::Potential(potential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_labels() {
        assert_eq!(LocatedSource::evaluated("").origin_label(), "<evaluated>");
        assert_eq!(LocatedSource::internal("").origin_label(), "<internal>");
        let from_file = LocatedSource::new("", Some(PathBuf::from("a/b.php")));
        assert_eq!(from_file.origin_label(), "a/b.php");
    }

    #[test]
    fn potential_source_reads_file_on_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.php");
        std::fs::write(&path, "<?php class Foo {}").unwrap();

        let located = Located::from(PotentiallyLocatedSource::new(&path));
        let source = located.into_definite().unwrap();

        assert_eq!(source.text(), "<?php class Foo {}");
        assert_eq!(source.origin(), Some(path.as_path()));
        assert!(!source.is_internal());
    }

    #[test]
    fn potential_source_with_vanished_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let located = Located::from(PotentiallyLocatedSource::new(dir.path().join("gone.php")));
        assert!(matches!(located.into_definite(), Err(Error::Io { .. })));
    }
}
