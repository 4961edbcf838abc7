//! Crate-level error types for phpreflect.
use std::path::PathBuf;

use crate::identifier::IdentifierKind;

/// Every error carries enough context to produce a useful diagnostic
/// without a debugger. Misses inside the pipeline are `Option`s, not errors;
/// `IdentifierNotFound` is only raised at the `Reflector` boundary.
#[allow(clippy::error_impl_error, reason = "crate-wide error type re-exported as phpreflect::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `replace_body` was given input it cannot turn into statements.
    #[error("cannot replace body of `{function}`: {reason}")]
    BodyReplacement {
        /// Name of the function or method whose body was being replaced.
        function: String,
        /// Why the replacement was rejected.
        reason: String,
    },

    /// A config file was named explicitly but does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Tree-sitter refused to load one of the PHP grammars.
    #[error("grammar unavailable: {reason}")]
    Grammar {
        /// Description of the failure reported by tree-sitter.
        reason: String,
    },

    /// No configured locator produced a declaration for the identifier.
    #[error("{kind} `{name}` not found")]
    IdentifierNotFound {
        /// Kind of declaration that was requested.
        kind: IdentifierKind,
        /// Name that was requested.
        name: String,
    },

    /// A locator was constructed with arguments it can never serve.
    #[error("invalid locator configuration: {reason}")]
    InvalidLocatorConfiguration {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// Reading a file that was expected to exist failed.
    #[error("io: {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// JSON serialization of CLI output failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// Neither PHP grammar could parse the located text.
    #[error("parse failed: {origin}: near `{snippet}`")]
    ParseFailure {
        /// File path, or a label such as `<evaluated>` for in-memory code.
        origin: String,
        /// Leading fragment of the text, for orientation.
        snippet: String,
    },

    /// Located source exceeds the configured size limit.
    #[error("source too large ({size_bytes} bytes, max {max_bytes}): {origin}")]
    SourceTooLarge {
        /// Maximum allowed size in bytes.
        max_bytes: u64,
        /// File path or label of the oversized source.
        origin: String,
        /// Actual size in bytes.
        size_bytes: u64,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}

impl Error {
    /// Wrap an I/O error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the expected "nothing matched" failure rather than a fault.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::IdentifierNotFound { .. })
    }
}
