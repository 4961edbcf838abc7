//! Resolution of located PHP text to the declarations it contains.

use std::rc::Rc;

use tree_sitter::Node;

use crate::error::Error;
use crate::grammar;
use crate::identifier::{DeclarationKind, Identifier, IdentifierKind};
use crate::located::LocatedSource;
use crate::reflection::{Namespace, Reflection, ReflectionClass, ReflectionFunction};
use crate::reflector::Reflector;
use crate::syntax::{DocCommentTracker, SyntaxNode, node_text};

/// Default maximum source size (16 MiB).
pub const MAX_SOURCE_BYTES: u64 = 16 * 1024 * 1024;

/// Parses located text and materializes the declarations matching a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    /// Texts larger than this are rejected before parsing.
    max_source_bytes: u64,
}

/// A top-level statement, classified for the declaration walk.
enum Statement<'t> {
    /// A class, interface, trait or enum declaration.
    ClassLike(Node<'t>),
    /// A free function declaration.
    Function(Node<'t>),
    /// `namespace A\B;` has no body; `namespace A\B { }` and `namespace { }` do.
    Namespace {
        /// The braced block, if any.
        body: Option<Node<'t>>,
        /// Declared namespace; global for `namespace { }`.
        name: Namespace,
    },
    /// Anything that declares nothing.
    Other,
}

/// A declaration found in the tree, not yet materialized.
struct Candidate<'t> {
    /// Doc comment directly preceding the declaration.
    doc_comment: Option<String>,
    /// Syntactic shape.
    kind: DeclarationKind,
    /// Enclosing namespace.
    namespace: Namespace,
    /// Declaration node in the parsed tree.
    node: Node<'t>,
    /// Namespace plus short name, matched against the query.
    qualified_name: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(MAX_SOURCE_BYTES)
    }
}

impl Resolver {
    /// A resolver rejecting texts over `max_source_bytes`.
    pub const fn new(max_source_bytes: u64) -> Self {
        Self { max_source_bytes }
    }

    /// Size limit in bytes.
    pub const fn max_source_bytes(&self) -> u64 {
        self.max_source_bytes
    }

    /// Materialize every declaration of `kind` in document order.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceTooLarge` if the text exceeds the size limit,
    /// or `Error::ParseFailure` if neither grammar parses it.
    pub fn resolve_all(
        &self,
        source: &Rc<LocatedSource>,
        kind: IdentifierKind,
        reflector: &Rc<Reflector>,
    ) -> Result<Vec<Reflection>, Error> {
        self.check_size(source)?;
        let text = source.text();
        let parsed = grammar::parse(text, &source.origin_label())?;
        let candidates = collect_candidates(parsed.tree().root_node(), text, kind);

        tracing::debug!(
            origin = %source.origin_label(),
            dialect = %parsed.dialect(),
            candidates = candidates.len(),
            "resolved all"
        );

        Ok(candidates
            .into_iter()
            .filter_map(|c| materialize(c, text, source, reflector))
            .collect())
    }

    /// Materialize the first declaration, in document order, whose qualified
    /// name matches the identifier. A miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceTooLarge` if the text exceeds the size limit,
    /// or `Error::ParseFailure` if neither grammar parses it.
    pub fn resolve_one(
        &self,
        source: &Rc<LocatedSource>,
        identifier: &Identifier,
        reflector: &Rc<Reflector>,
    ) -> Result<Option<Reflection>, Error> {
        self.check_size(source)?;
        let text = source.text();
        let parsed = grammar::parse(text, &source.origin_label())?;
        let candidates = collect_candidates(parsed.tree().root_node(), text, identifier.kind());
        let total = candidates.len();

        let found = candidates
            .into_iter()
            .find(|c| identifier.matches_name(&c.qualified_name));

        tracing::debug!(
            identifier = identifier.name(),
            origin = %source.origin_label(),
            dialect = %parsed.dialect(),
            candidates = total,
            found = found.is_some(),
            "resolved one"
        );

        Ok(found.and_then(|c| materialize(c, text, source, reflector)))
    }

    /// Reject texts over the size limit.
    fn check_size(&self, source: &LocatedSource) -> Result<(), Error> {
        let size_bytes: u64 = source.text().len().try_into().unwrap_or(u64::MAX);
        if size_bytes > self.max_source_bytes {
            return Err(Error::SourceTooLarge {
                max_bytes: self.max_source_bytes,
                origin: source.origin_label(),
                size_bytes,
            });
        }
        Ok(())
    }
}

// ── Declaration walk ───────────────────────────────────────────────────

/// Sort a top-level statement into what the walk cares about.
fn classify<'t>(node: Node<'t>, source: &str) -> Statement<'t> {
    match node.kind() {
        "namespace_definition" => Statement::Namespace {
            body: node.child_by_field_name("body"),
            name: node
                .child_by_field_name("name")
                .map(|n| Namespace::from_name(node_text(n, source)))
                .unwrap_or_default(),
        },
        "class_declaration" | "enum_declaration" | "interface_declaration"
        | "trait_declaration" => Statement::ClassLike(node),
        "function_definition" => Statement::Function(node),
        _ => Statement::Other,
    }
}

/// Walk top-level statements and braced namespace bodies, keeping the
/// declarations `kind` accepts.
fn collect_candidates<'t>(root: Node<'t>, source: &str, kind: IdentifierKind) -> Vec<Candidate<'t>> {
    let mut candidates = Vec::new();
    // Scope of an unbraced `namespace A;` runs until the next namespace statement.
    let mut current = Namespace::global();
    let mut tracker = DocCommentTracker::default();
    let mut cursor = root.walk();

    for node in root.named_children(&mut cursor) {
        let doc_comment = tracker.observe(node.kind(), || node_text(node, source).to_string());
        match classify(node, source) {
            Statement::Namespace {
                body: Some(body),
                name,
            } => {
                collect_scope(body, source, &name, kind, &mut candidates);
                current = Namespace::global();
            },
            Statement::Namespace { body: None, name } => current = name,
            Statement::ClassLike(decl) => {
                push_candidate(decl, DeclarationKind::ClassLike, &current, doc_comment, source, kind, &mut candidates);
            },
            Statement::Function(decl) => {
                push_candidate(decl, DeclarationKind::Function, &current, doc_comment, source, kind, &mut candidates);
            },
            Statement::Other => {},
        }
    }

    candidates
}

/// Declarations directly inside a braced namespace body.
fn collect_scope<'t>(
    body: Node<'t>,
    source: &str,
    namespace: &Namespace,
    kind: IdentifierKind,
    candidates: &mut Vec<Candidate<'t>>,
) {
    let mut tracker = DocCommentTracker::default();
    let mut cursor = body.walk();

    for node in body.named_children(&mut cursor) {
        let doc_comment = tracker.observe(node.kind(), || node_text(node, source).to_string());
        match classify(node, source) {
            Statement::ClassLike(decl) => {
                push_candidate(decl, DeclarationKind::ClassLike, namespace, doc_comment, source, kind, candidates);
            },
            Statement::Function(decl) => {
                push_candidate(decl, DeclarationKind::Function, namespace, doc_comment, source, kind, candidates);
            },
            // Namespaces do not nest.
            Statement::Namespace { .. } | Statement::Other => {},
        }
    }
}

/// Record a declaration if the query kind accepts it and it has a name.
fn push_candidate<'t>(
    node: Node<'t>,
    declaration: DeclarationKind,
    namespace: &Namespace,
    doc_comment: Option<String>,
    source: &str,
    kind: IdentifierKind,
    candidates: &mut Vec<Candidate<'t>>,
) {
    if !kind.matches_declaration(declaration) {
        return;
    }
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };

    candidates.push(Candidate {
        doc_comment,
        kind: declaration,
        namespace: namespace.clone(),
        node,
        qualified_name: namespace.qualify(node_text(name, source)),
    });
}

/// Copy the candidate out of the tree and build its descriptor.
fn materialize(
    candidate: Candidate<'_>,
    source: &str,
    located: &Rc<LocatedSource>,
    reflector: &Rc<Reflector>,
) -> Option<Reflection> {
    let node = SyntaxNode::from_tree_sitter(candidate.node, source);
    let reflector = Rc::clone(reflector);
    let located = Rc::clone(located);

    match candidate.kind {
        DeclarationKind::ClassLike => {
            ReflectionClass::new(reflector, node, located, candidate.namespace, candidate.doc_comment)
                .map(Reflection::Class)
        },
        DeclarationKind::Function => ReflectionFunction::new(
            reflector,
            node,
            located,
            candidate.namespace,
            candidate.doc_comment,
            None,
        )
        .map(Reflection::Function),
    }
}
