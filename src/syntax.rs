//! Owned syntax fragments detached from a tree-sitter tree.
//!
//! A tree-sitter `Tree` is immutable and its nodes borrow it, so a matched
//! declaration is copied out into `SyntaxNode`s that a descriptor can keep
//! and, for bodies, overwrite.
//!
//! Expressions can nest arbitrarily deep, so every walk over a `SyntaxNode`
//! (copying, searching, cloning, comparing and dropping) uses an explicit
//! stack instead of the call stack.

use std::fmt;
use std::mem;

use tree_sitter::Node;

/// Node kinds copied out as a single leaf holding their verbatim source text.
/// Their inner tokens must never be re-spaced by a printer.
const ATOMIC_KINDS: &[&str] = &[
    "by_ref",
    "comment",
    "encapsed_string",
    "float",
    "heredoc",
    "integer",
    "name",
    "namespace_name",
    "nowdoc",
    "qualified_name",
    "relative_name",
    "shell_command_expression",
    "string",
    "variable_name",
];

/// Node kinds that are never statements of a body.
const NON_STATEMENT_KINDS: &[&str] = &["comment", "php_tag", "text", "text_interpolation"];

/// Location of a node in the text it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset one past the node's last byte.
    pub end_byte: usize,
    /// One-based.
    pub end_line: usize,
    /// Byte offset of the node's first byte.
    pub start_byte: usize,
    /// One-based.
    pub start_line: usize,
}

/// An owned copy of one tree-sitter node and its descendants.
pub struct SyntaxNode {
    /// Child nodes in source order, anonymous tokens included.
    children: Vec<SyntaxNode>,
    /// Field name this node occupies in its parent, if any.
    field: Option<&'static str>,
    /// Grammar kind, e.g. `function_definition`.
    kind: &'static str,
    /// Named node, as opposed to an anonymous token.
    named: bool,
    /// Where the node came from; absent on nodes built from snippets.
    span: Option<Span>,
    /// Present on leaves and atomic nodes only.
    text: Option<String>,
}

/// Pre-order iterator over a node and everything beneath it.
pub struct Descendants<'a> {
    /// Nodes still to visit, next one on top.
    stack: Vec<&'a SyntaxNode>,
}

/// Tracks the `/** ... */` comment that applies to the next declaration
/// while walking a sibling list. Plain comments in between do not detach it.
#[derive(Debug, Default)]
pub struct DocCommentTracker {
    /// Most recent doc comment not yet claimed by a declaration.
    pending: Option<String>,
}

impl Span {
    /// Span of a tree-sitter node.
    fn of(node: Node<'_>) -> Self {
        Self {
            end_byte: node.end_byte(),
            end_line: node.end_position().row.saturating_add(1),
            start_byte: node.start_byte(),
            start_line: node.start_position().row.saturating_add(1),
        }
    }
}

impl SyntaxNode {
    /// Copy `node` and everything under it out of its tree.
    ///
    /// The cursor walks the tree in document order. `open` holds the copies
    /// of the ancestors whose children are still being collected.
    pub fn from_tree_sitter(node: Node<'_>, source: &str) -> Self {
        let mut cursor = node.walk();
        let mut open: Vec<Self> = Vec::new();

        loop {
            let current = cursor.node();
            let mut done = Self::copy_of(current, cursor.field_name(), source);
            if done.text.is_none() && cursor.goto_first_child() {
                open.push(done);
                continue;
            }

            // `done` is complete; attach it and climb until a sibling is found.
            loop {
                let Some(mut parent) = open.pop() else {
                    return done;
                };
                parent.children.push(done);
                if cursor.goto_next_sibling() {
                    open.push(parent);
                    break;
                }
                cursor.goto_parent();
                done = parent;
            }
        }
    }

    /// Childless copy of one tree-sitter node. Leaves and atomic kinds get
    /// their source text.
    fn copy_of(node: Node<'_>, field: Option<&'static str>, source: &str) -> Self {
        let atomic = node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind());
        Self {
            children: Vec::new(),
            field,
            kind: node.kind(),
            named: node.is_named(),
            span: Some(Span::of(node)),
            text: atomic.then(|| node_text(node, source).to_string()),
        }
    }

    /// Copy of this node alone, carrying `children` in place of its own.
    fn with_children(&self, children: Vec<Self>) -> Self {
        Self {
            children,
            field: self.field,
            kind: self.kind,
            named: self.named,
            span: self.span,
            text: self.text.clone(),
        }
    }

    /// Everything but the children is equal.
    fn shallow_eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.kind == other.kind
            && self.named == other.named
            && self.span == other.span
            && self.text == other.text
            && self.children.len() == other.children.len()
    }

    /// Grammar kind of this node.
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Named node, as opposed to an anonymous token like `(` or `function`.
    pub const fn is_named(&self) -> bool {
        self.named
    }

    /// Source location, absent on nodes parsed from a replacement snippet.
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Direct children in source order.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Leaf or atomic text. `None` for interior nodes.
    pub fn leaf_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All leaf text under this node joined by single spaces.
    pub fn text(&self) -> String {
        let tokens: Vec<&str> = self
            .descendants()
            .filter_map(Self::leaf_text)
            .filter(|text| !text.is_empty())
            .collect();
        tokens.join(" ")
    }

    /// Leaf text with the spacing squeezed out, for names and types.
    pub fn compact_text(&self) -> String {
        self.text().chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// First child occupying `field`.
    pub fn child_by_field(&self, field: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// Mutable access to the first child occupying `field`.
    fn child_by_field_mut(&mut self, field: &str) -> Option<&mut Self> {
        self.children.iter_mut().find(|c| c.field == Some(field))
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, kind: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Is there a direct child of the given kind?
    pub fn has_child_of_kind(&self, kind: &str) -> bool {
        self.child_of_kind(kind).is_some()
    }

    /// Direct children that are named nodes.
    pub fn named_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(|c| c.named)
    }

    /// This node and everything beneath it, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Does this node, or anything reachable beneath it, satisfy `predicate`?
    ///
    /// Unrestricted descent: nested closures and class bodies are searched too.
    pub fn any(&self, predicate: &dyn Fn(&Self) -> bool) -> bool {
        self.descendants().any(predicate)
    }

    /// Statement children of a block-like node (`compound_statement`,
    /// `program`), skipping braces, tags and comments.
    pub fn statements(&self) -> impl Iterator<Item = &Self> {
        self.children
            .iter()
            .filter(|c| c.named && !NON_STATEMENT_KINDS.contains(&c.kind))
    }

    /// Body block (`body` field) of a function-like node.
    pub fn body(&self) -> Option<&Self> {
        self.child_by_field("body")
    }

    /// Overwrite the statements of this node's `body` block, keeping its braces.
    ///
    /// Returns `false` when there is no body block to write into.
    pub fn replace_body_statements(&mut self, statements: Vec<Self>) -> bool {
        let Some(body) = self.child_by_field_mut("body") else {
            return false;
        };

        let mut braces = mem::take(&mut body.children)
            .into_iter()
            .filter(|c| !c.named);
        let open = braces.next();
        let close = braces.next_back();

        body.children = open.into_iter().chain(statements).chain(close).collect();
        true
    }
}

impl Clone for SyntaxNode {
    fn clone(&self) -> Self {
        // Walking the pre-order list backwards visits every child before its
        // parent, so a node's copied children sit on top of `built`, last
        // child deepest.
        let order: Vec<&Self> = self.descendants().collect();
        let mut built: Vec<Self> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let first = built.len().saturating_sub(node.children.len());
            let children: Vec<Self> = built.drain(first..).rev().collect();
            built.push(node.with_children(children));
        }
        built
            .pop()
            .unwrap_or_else(|| self.with_children(Vec::new()))
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        // Equal pre-order sequences with equal child counts describe equal trees.
        let mut left = self.descendants();
        let mut right = other.descendants();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.shallow_eq(b) => {}
                _ => return false,
            }
        }
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind)
            .field("span", &self.span)
            .field("text", &self.text)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl Drop for SyntaxNode {
    fn drop(&mut self) {
        // Detach descendants onto a flat list so each node drops childless.
        let mut pending = mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl DocCommentTracker {
    /// Feed the next sibling. Returns the doc comment attached to it, if it
    /// is not itself a comment.
    pub fn observe(&mut self, kind: &str, text: impl FnOnce() -> String) -> Option<String> {
        if kind != "comment" {
            return self.pending.take();
        }
        let text = text();
        if text.starts_with("/**") {
            self.pending = Some(text);
        }
        None
    }
}

/// Source text covered by a tree-sitter node.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Re-indent a `/** ... */` block so continuation lines start with ` *`,
/// independent of how deeply the declaration was nested.
pub fn reformat_doc_comment(raw: &str) -> String {
    let mut lines = raw.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };

    let mut out = first.trim().to_string();
    for line in lines {
        let trimmed = line.trim();
        out.push('\n');
        if trimmed.starts_with('*') {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}
