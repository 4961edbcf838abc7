//! Project configuration and the locator chain it describes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::locator::{
    AggregateSourceLocator, ClassMap, ClassMapSourceLocator, InternalSourceLocator, Psr4Loader,
    SingleFileSourceLocator,
};
use crate::resolver::{MAX_SOURCE_BYTES, Resolver};

/// Name of the project config file looked up in the root directory.
pub const CONFIG_FILE: &str = ".phpreflect.toml";

/// Project configuration loaded from `.phpreflect.toml`.
/// Relative paths are resolved against the directory the file was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Class name to file, as written.
    class_map: BTreeMap<String, PathBuf>,
    /// Files served whole, as written.
    files: Vec<PathBuf>,
    /// Resolver size limit in bytes.
    max_file_size: u64,
    /// PSR-4 namespace prefix to directory, as written.
    psr4: BTreeMap<String, PathBuf>,
    /// Directory relative paths are resolved against.
    root: PathBuf,
    /// Append the bundled stub locator.
    stubs: bool,
}

/// Raw TOML structure for `.phpreflect.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PhpreflectTomlConfig {
    /// `[class_map]` table.
    #[serde(default)]
    class_map: BTreeMap<String, PathBuf>,
    /// `files = [...]`.
    #[serde(default)]
    files: Vec<PathBuf>,
    /// `max_file_size = <bytes>`.
    #[serde(default = "default_max_file_size")]
    max_file_size: u64,
    /// `[psr4]` table.
    #[serde(default)]
    psr4: BTreeMap<String, PathBuf>,
    /// `stubs = <bool>`.
    #[serde(default = "default_stubs")]
    stubs: bool,
}

impl Config {
    /// Load config from `.phpreflect.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults(root)),
            Err(e) => return Err(Error::io(path, e)),
        };

        Self::parse(root, &content)
    }

    /// Load from an explicitly named file; its directory becomes the root.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file does not exist,
    /// `Error::Io` if reading fails, or `Error::TomlDe` if it is malformed.
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(e) => return Err(Error::io(path, e)),
        };

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(root, &content)
    }

    /// Build from TOML text found under `root`.
    fn parse(root: &Path, content: &str) -> Result<Self, Error> {
        let raw: PhpreflectTomlConfig = toml::from_str(content)?;
        Ok(Self {
            class_map: raw.class_map,
            files: raw.files,
            max_file_size: raw.max_file_size,
            psr4: raw.psr4,
            root: root.to_path_buf(),
            stubs: raw.stubs,
        })
    }

    /// Stubs only, default size limit.
    pub fn defaults(root: &Path) -> Self {
        Self {
            class_map: BTreeMap::new(),
            files: Vec::new(),
            max_file_size: MAX_SOURCE_BYTES,
            psr4: BTreeMap::new(),
            root: root.to_path_buf(),
            stubs: true,
        }
    }

    /// Directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the bundled stubs end the chain.
    pub const fn stubs(&self) -> bool {
        self.stubs
    }

    /// Resolver size limit in bytes.
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Configured single files, resolved against the root.
    pub fn files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.resolve_path(f)).collect()
    }

    /// Put `paths` ahead of the configured files, keeping their order.
    pub fn prepend_files(&mut self, paths: Vec<PathBuf>) {
        self.files.splice(0..0, paths);
    }

    /// Build the locator chain: files, class map, PSR-4, stubs.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLocatorConfiguration` if a configured file is
    /// missing or not a regular file.
    pub fn build_locator(&self) -> Result<AggregateSourceLocator, Error> {
        let mut aggregate = AggregateSourceLocator::new();

        for file in self.files() {
            aggregate.push(Box::new(SingleFileSourceLocator::new(file)?));
        }

        if !self.class_map.is_empty() {
            let map = self
                .class_map
                .iter()
                .fold(ClassMap::new(), |map, (name, path)| map.with(name, self.resolve_path(path)));
            aggregate.push(Box::new(ClassMapSourceLocator::new(map)));
        }

        if !self.psr4.is_empty() {
            let loader = self
                .psr4
                .iter()
                .fold(Psr4Loader::new(), |loader, (prefix, dir)| {
                    loader.with(prefix, self.resolve_path(dir))
                });
            aggregate.push(Box::new(ClassMapSourceLocator::new(loader)));
        }

        if self.stubs {
            aggregate.push(Box::new(InternalSourceLocator::new()));
        }

        tracing::debug!(locators = ?aggregate.labels(), "built locator chain");
        Ok(aggregate)
    }

    /// A resolver with the configured size limit.
    pub const fn resolver(&self) -> Resolver {
        Resolver::new(self.max_file_size)
    }

    /// Absolute paths pass through; relative ones hang off the root.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.root.join(path)
    }
}

/// Serde default for `max_file_size`.
const fn default_max_file_size() -> u64 {
    MAX_SOURCE_BYTES
}

/// Serde default for `stubs`.
const fn default_stubs() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::defaults(dir.path()));
        assert!(config.stubs());
        assert_eq!(config.max_file_size(), MAX_SOURCE_BYTES);
        assert_eq!(config.build_locator().unwrap().labels(), ["internal"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "files = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "stub = false").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn explicit_missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_file(&dir.path().join("custom.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn locator_order_follows_sections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helpers.php"), "<?php function helper() {}").unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
files = ["helpers.php"]
stubs = false
max_file_size = 1024

[class_map]
"App\\Kernel" = "src/Kernel.php"

[psr4]
"App\\" = "src/"
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.files(), [dir.path().join("helpers.php")]);
        assert_eq!(config.resolver().max_source_bytes(), 1024);
        assert_eq!(
            config.build_locator().unwrap().labels(),
            ["single_file", "class_map", "class_map"]
        );
    }

    #[test]
    fn configured_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"files = ["missing.php"]"#).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(matches!(
            config.build_locator(),
            Err(Error::InvalidLocatorConfiguration { .. })
        ));
    }
}
