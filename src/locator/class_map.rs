//! Locators that map class names to files without reading them.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::identifier::{Identifier, IdentifierKind};
use crate::located::{Located, PotentiallyLocatedSource};
use crate::locator::SourceLocator;

/// Maps a class name to the file that should declare it, without reading it.
pub trait ClassLoader {
    /// Path of the file expected to declare `class_name`, if known.
    fn find_file(&self, class_name: &str) -> Option<PathBuf>;
}

/// Explicit class name to file table. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    /// File per lowercase class name without a leading separator.
    entries: HashMap<String, PathBuf>,
}

/// PSR-4 autoloading: namespace prefix to base directory.
#[derive(Debug, Clone, Default)]
pub struct Psr4Loader {
    /// Kept sorted longest prefix first.
    prefixes: Vec<(String, PathBuf)>,
}

/// Locates classes through a `ClassLoader`; functions always miss.
///
/// Hits are `PotentiallyLocatedSource`s: the file is read only when the
/// reflector normalizes the result.
#[derive(Debug, Clone)]
pub struct ClassMapSourceLocator<L: ClassLoader> {
    /// Maps a class name to its expected file.
    loader: L,
}

impl ClassMap {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `class_name` to `path`, replacing any earlier entry.
    pub fn insert(&mut self, class_name: &str, path: impl Into<PathBuf>) {
        self.entries.insert(normalize(class_name), path.into());
    }

    /// Builder form of `insert`.
    #[must_use]
    pub fn with(mut self, class_name: &str, path: impl Into<PathBuf>) -> Self {
        self.insert(class_name, path);
        self
    }

    /// Number of mapped classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassLoader for ClassMap {
    fn find_file(&self, class_name: &str) -> Option<PathBuf> {
        self.entries.get(&normalize(class_name)).cloned()
    }
}

impl Psr4Loader {
    /// A loader with no prefixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prefix` (e.g. `App\`) as rooted at `directory`.
    pub fn add(&mut self, prefix: &str, directory: impl Into<PathBuf>) {
        let mut prefix = prefix.trim_start_matches('\\').to_string();
        if !prefix.is_empty() && !prefix.ends_with('\\') {
            prefix.push('\\');
        }
        self.prefixes.push((prefix, directory.into()));
        self.prefixes.sort_by_key(|(prefix, _)| Reverse(prefix.len()));
    }

    /// Builder form of `add`.
    #[must_use]
    pub fn with(mut self, prefix: &str, directory: impl Into<PathBuf>) -> Self {
        self.add(prefix, directory);
        self
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// No prefixes registered.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl ClassLoader for Psr4Loader {
    /// Longest matching prefix first; only files that exist are returned.
    fn find_file(&self, class_name: &str) -> Option<PathBuf> {
        let class_name = class_name.trim_start_matches('\\');
        self.prefixes.iter().find_map(|(prefix, directory)| {
            let relative = class_name.strip_prefix(prefix.as_str())?;
            let candidate = psr4_path(directory, relative);
            candidate.is_file().then_some(candidate)
        })
    }
}

impl<L: ClassLoader> ClassMapSourceLocator<L> {
    /// Locate classes through `loader`.
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }
}

impl<L: ClassLoader> SourceLocator for ClassMapSourceLocator<L> {
    fn locate(&self, identifier: &Identifier) -> Result<Option<Located>, Error> {
        if identifier.kind() != IdentifierKind::Class || identifier.is_wildcard() {
            return Ok(None);
        }
        let Some(path) = self.loader.find_file(identifier.name()) else {
            return Ok(None);
        };
        let potential = PotentiallyLocatedSource::new(path);
        tracing::trace!(class = identifier.name(), path = %potential.path().display(), "mapped");
        Ok(Some(potential.into()))
    }

    fn label(&self) -> &'static str {
        "class_map"
    }
}

/// Table key for a class name.
fn normalize(class_name: &str) -> String {
    class_name.trim_start_matches('\\').to_ascii_lowercase()
}

/// `Model\User` under `src/` becomes `src/Model/User.php`.
fn psr4_path(directory: &Path, relative: &str) -> PathBuf {
    let mut path = directory.to_path_buf();
    for segment in relative.split('\\') {
        path.push(segment);
    }
    path.set_extension("php");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_map_ignores_case_and_leading_separator() {
        let map = ClassMap::new().with("App\\Kernel", "src/Kernel.php");
        assert_eq!(map.find_file("\\app\\KERNEL"), Some(PathBuf::from("src/Kernel.php")));
        assert_eq!(map.find_file("App\\Other"), None);
    }

    #[test]
    fn locator_misses_functions_and_wildcards() {
        let locator = ClassMapSourceLocator::new(ClassMap::new().with("foo", "foo.php"));
        assert!(locator.locate(&Identifier::function("foo")).unwrap().is_none());
        assert!(locator
            .locate(&Identifier::wildcard(IdentifierKind::Class))
            .unwrap()
            .is_none());
    }

    #[test]
    fn locator_returns_potential_source() {
        let locator = ClassMapSourceLocator::new(ClassMap::new().with("Foo", "lib/Foo.php"));
        let located = locator.locate(&Identifier::class("Foo")).unwrap();
        assert_eq!(
            located,
            Some(Located::Potential(PotentiallyLocatedSource::new("lib/Foo.php")))
        );
    }

    #[test]
    fn psr4_prefers_longest_existing_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let general = dir.path().join("src");
        let specific = dir.path().join("models");
        std::fs::create_dir_all(general.join("Model")).unwrap();
        std::fs::create_dir_all(&specific).unwrap();
        std::fs::write(general.join("Model").join("User.php"), "<?php").unwrap();
        std::fs::write(specific.join("User.php"), "<?php").unwrap();
        std::fs::write(general.join("Kernel.php"), "<?php").unwrap();

        let loader = Psr4Loader::new()
            .with("App", &general)
            .with("App\\Model\\", &specific);

        assert_eq!(loader.find_file("App\\Model\\User"), Some(specific.join("User.php")));
        assert_eq!(loader.find_file("\\App\\Kernel"), Some(general.join("Kernel.php")));
        assert_eq!(loader.find_file("App\\Missing"), None);
        assert_eq!(loader.find_file("Other\\Kernel"), None);
    }

    #[test]
    fn psr4_falls_back_to_shorter_prefix_when_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Model")).unwrap();
        std::fs::write(dir.path().join("Model").join("Post.php"), "<?php").unwrap();

        let loader = Psr4Loader::new()
            .with("App\\", dir.path())
            .with("App\\Model\\", dir.path().join("elsewhere"));

        assert_eq!(
            loader.find_file("App\\Model\\Post"),
            Some(dir.path().join("Model").join("Post.php"))
        );
    }
}
