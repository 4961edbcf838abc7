//! Tree-sitter PHP grammar selection with dialect fallback.
use std::fmt;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;

/// Characters of source quoted in a `ParseFailure`.
const SNIPPET_CHARS: usize = 60;

/// The two grammar variants tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Bare PHP with no opening tag, as stubs and `eval` fragments are written.
    Bare,
    /// Code with `<?php` tags and inline HTML around it.
    Template,
}

/// A successfully parsed text and the grammar that accepted it.
pub struct ParsedSource {
    /// Grammar that accepted the text.
    dialect: Dialect,
    /// The error-free tree.
    tree: Tree,
}

impl Dialect {
    /// The tree-sitter language for this dialect.
    fn language(self) -> Language {
        match self {
            Self::Bare => tree_sitter_php::LANGUAGE_PHP_ONLY.into(),
            Self::Template => tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare => f.write_str("php_only"),
            Self::Template => f.write_str("php"),
        }
    }
}

impl ParsedSource {
    /// Grammar that accepted the text.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The parsed tree.
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }
}

/// Parse `text` with the template grammar, retrying with the bare grammar
/// when the first attempt has errors or contains no PHP section at all.
///
/// # Errors
///
/// Returns `Error::ParseFailure` if neither grammar parses the text cleanly,
/// or `Error::Grammar` if tree-sitter rejects a grammar.
pub fn parse(text: &str, origin: &str) -> Result<ParsedSource, Error> {
    let template = parse_with(Dialect::Template, text)?;
    let template_clean = !template.root_node().has_error();
    if template_clean && has_php_section(template.root_node()) {
        return Ok(ParsedSource {
            dialect: Dialect::Template,
            tree: template,
        });
    }

    tracing::trace!(origin, "template grammar found no clean PHP section, retrying bare");
    let bare = parse_with(Dialect::Bare, text)?;
    if !bare.root_node().has_error() {
        return Ok(ParsedSource {
            dialect: Dialect::Bare,
            tree: bare,
        });
    }

    // Pure inline HTML is valid PHP with nothing declared in it.
    if template_clean {
        return Ok(ParsedSource {
            dialect: Dialect::Template,
            tree: template,
        });
    }

    Err(Error::ParseFailure {
        origin: origin.to_string(),
        snippet: snippet(text),
    })
}

/// Run one grammar over the text.
///
/// # Errors
///
/// Returns `Error::Grammar` if the language cannot be set or tree-sitter gives up.
fn parse_with(dialect: Dialect, text: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| Error::Grammar {
            reason: format!("{dialect}: {e}"),
        })?;

    parser.parse(text, None).ok_or_else(|| Error::Grammar {
        reason: format!("{dialect}: tree-sitter returned None"),
    })
}

/// Whether the program has an opening tag, i.e. anything besides inline HTML.
fn has_php_section(root: Node<'_>) -> bool {
    let mut cursor = root.walk();
    root.children(&mut cursor).any(|c| c.kind() == "php_tag")
}

/// Start of the text for error messages, on one line.
fn snippet(text: &str) -> String {
    let trimmed = text.trim_start();
    let mut out: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    if trimmed.chars().nth(SNIPPET_CHARS).is_some() {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_code_uses_template_grammar() {
        let parsed = parse("<?php function foo() {}", "<test>").unwrap();
        assert_eq!(parsed.dialect(), Dialect::Template);
    }

    #[test]
    fn untagged_code_falls_back_to_bare_grammar() {
        let parsed = parse("function foo() {}", "<test>").unwrap();
        assert_eq!(parsed.dialect(), Dialect::Bare);
        let root = parsed.tree().root_node();
        let mut cursor = root.walk();
        assert!(root.children(&mut cursor).any(|c| c.kind() == "function_definition"));
    }

    #[test]
    fn garbage_is_a_parse_failure_with_origin() {
        let err = parse("<?php function ( {", "broken.php").err().unwrap();
        match err {
            Error::ParseFailure { origin, snippet } => {
                assert_eq!(origin, "broken.php");
                assert!(snippet.starts_with("<?php function"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snippet_is_truncated() {
        let long = "x".repeat(200);
        let s = snippet(&long);
        assert_eq!(s.len(), SNIPPET_CHARS + 3);
        assert!(s.ends_with("..."));
    }
}
