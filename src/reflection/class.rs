//! Descriptors for classes, interfaces, traits and enums.
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::located::LocatedSource;
use crate::printer::{PrettyPrinter as _, StandardPrinter};
use crate::reflection::function::{MethodContext, ReflectionFunction};
use crate::reflection::Namespace;
use crate::reflector::Reflector;
use crate::syntax::{DocCommentTracker, SyntaxNode, reformat_doc_comment};

/// Which class-like declaration this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// `class`, abstract and final ones included.
    Class,
    /// `enum`, pure or backed.
    Enum,
    /// `interface`.
    Interface,
    /// `trait`.
    Trait,
}

/// A method's place in the class body, built once at construction.
#[derive(Debug, Clone)]
struct MethodEntry {
    /// Raw doc comment preceding the method.
    doc_comment: Option<String>,
    /// Index into the body's children.
    index: usize,
    /// Lookup key; PHP method names are case-insensitive.
    lowercase_name: String,
}

/// A class-like declaration built around its owned node.
pub struct ReflectionClass {
    /// Raw `/** ... */` text preceding the declaration.
    doc_comment: Option<String>,
    /// Which class-like keyword declared it.
    kind: ClassKind,
    /// Source the declaration was found in.
    located: Rc<LocatedSource>,
    /// Method index over the body, in declaration order.
    methods: Vec<MethodEntry>,
    /// Enclosing namespace of the declaration.
    namespace: Namespace,
    /// Owned declaration node.
    node: SyntaxNode,
    /// Used to reflect parents and to hand to methods.
    reflector: Rc<Reflector>,
}

impl ClassKind {
    /// Map a tree-sitter declaration kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "enum_declaration" => Some(Self::Enum),
            "interface_declaration" => Some(Self::Interface),
            "trait_declaration" => Some(Self::Trait),
            _ => None,
        }
    }

    /// The PHP keyword introducing this declaration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Trait => "trait",
        }
    }
}

impl ReflectionClass {
    /// Build from a class-like node. Returns `None` for any other node kind.
    pub(crate) fn new(
        reflector: Rc<Reflector>,
        node: SyntaxNode,
        located: Rc<LocatedSource>,
        namespace: Namespace,
        doc_comment: Option<String>,
    ) -> Option<Self> {
        let kind = ClassKind::from_node_kind(node.kind())?;
        let methods = index_methods(&node);

        Some(Self {
            doc_comment,
            kind,
            located,
            methods,
            namespace,
            node,
            reflector,
        })
    }

    // ── Names ──────────────────────────────────────────────────────────

    /// Fully qualified name, e.g. `App\Model\User`.
    pub fn name(&self) -> String {
        self.namespace.qualify(self.short_name())
    }

    /// Name as written in the declaration.
    pub fn short_name(&self) -> &str {
        self.node
            .child_by_field("name")
            .and_then(SyntaxNode::leaf_text)
            .unwrap_or("")
    }

    /// `A\B` for `A\B\Foo`; empty in the global namespace.
    pub fn namespace_name(&self) -> String {
        self.namespace.name()
    }

    /// Declared outside the global namespace.
    pub fn in_namespace(&self) -> bool {
        !self.namespace.is_global()
    }

    // ── Kind and modifiers ─────────────────────────────────────────────

    /// Which class-like keyword declared it.
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Declared with `interface`.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Declared with `trait`.
    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    /// Declared with `enum`.
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Explicitly abstract, or an interface.
    pub fn is_abstract(&self) -> bool {
        self.is_interface() || self.node.has_child_of_kind("abstract_modifier")
    }

    /// Carries the `final` modifier.
    pub fn is_final(&self) -> bool {
        self.node.has_child_of_kind("final_modifier")
    }

    /// Declared in a bundled stub rather than user code.
    pub fn is_internal(&self) -> bool {
        self.located.is_internal()
    }

    /// Opposite of `is_internal`.
    pub fn is_user_defined(&self) -> bool {
        !self.is_internal()
    }

    // ── Hierarchy ──────────────────────────────────────────────────────

    /// Qualified name of the `extends` target. Interfaces have none; their
    /// `extends` list is reported by `interface_names`.
    pub fn parent_class_name(&self) -> Option<String> {
        if self.is_interface() {
            return None;
        }
        self.clause_names("base_clause").into_iter().next()
    }

    /// Reflect the parent class through the reflector.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdentifierNotFound` if the parent cannot be located.
    pub fn parent_class(&self) -> Result<Option<Self>, Error> {
        self.parent_class_name()
            .map(|name| self.reflector.reflect_class(&name))
            .transpose()
    }

    /// Directly implemented interfaces, or extended ones for an interface.
    pub fn interface_names(&self) -> Vec<String> {
        if self.is_interface() {
            return self.clause_names("base_clause");
        }
        self.clause_names("class_interface_clause")
    }

    /// Resolved names listed in the clause of the given kind.
    fn clause_names(&self, clause_kind: &str) -> Vec<String> {
        self.node
            .child_of_kind(clause_kind)
            .map(|clause| {
                clause
                    .named_children()
                    .map(|n| self.namespace.resolve(&n.compact_text()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Members ────────────────────────────────────────────────────────

    /// Methods in declaration order.
    pub fn methods(&self) -> Vec<ReflectionFunction> {
        self.methods
            .iter()
            .filter_map(|entry| self.materialize_method(entry))
            .collect()
    }

    /// Case-insensitive lookup through the method index.
    pub fn method(&self, name: &str) -> Option<ReflectionFunction> {
        let lowercase = name.to_ascii_lowercase();
        self.methods
            .iter()
            .find(|entry| entry.lowercase_name == lowercase)
            .and_then(|entry| self.materialize_method(entry))
    }

    /// Case-insensitive.
    pub fn has_method(&self, name: &str) -> bool {
        let lowercase = name.to_ascii_lowercase();
        self.methods.iter().any(|entry| entry.lowercase_name == lowercase)
    }

    /// Method names as written, in declaration order.
    pub fn method_names(&self) -> Vec<&str> {
        self.body_members()
            .filter(|m| m.kind() == "method_declaration")
            .filter_map(|m| m.child_by_field("name").and_then(SyntaxNode::leaf_text))
            .collect()
    }

    /// Build the descriptor for one indexed method.
    fn materialize_method(&self, entry: &MethodEntry) -> Option<ReflectionFunction> {
        let node = self.body()?.children().get(entry.index)?.clone();
        ReflectionFunction::new(
            Rc::clone(&self.reflector),
            node,
            Rc::clone(&self.located),
            self.namespace.clone(),
            entry.doc_comment.clone(),
            Some(MethodContext {
                class_kind: self.kind,
                class_name: self.name(),
            }),
        )
    }

    /// Constants (and enum cases) with their values rendered as PHP, in order.
    pub fn constants(&self) -> Vec<(String, String)> {
        let mut constants = Vec::new();
        for member in self.body_members() {
            match member.kind() {
                "const_declaration" => {
                    for element in member.named_children().filter(|c| c.kind() == "const_element") {
                        if let Some(constant) = name_and_value(element) {
                            constants.push(constant);
                        }
                    }
                },
                "enum_case" => {
                    if let Some(constant) = name_and_value(member) {
                        constants.push(constant);
                    }
                },
                _ => {},
            }
        }
        constants
    }

    /// Declared properties without the `$`, including promoted constructor
    /// parameters.
    pub fn property_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for member in self.body_members() {
            if member.kind() == "property_declaration" {
                names.extend(
                    member
                        .named_children()
                        .filter(|c| c.kind() == "property_element")
                        .filter_map(|e| e.child_of_kind("variable_name"))
                        .map(|v| v.compact_text().trim_start_matches('$').to_string()),
                );
            }
        }
        if let Some(constructor) = self.method("__construct") {
            names.extend(
                constructor
                    .parameters()
                    .into_iter()
                    .filter(|p| p.is_promoted())
                    .map(|p| p.name().to_string()),
            );
        }
        names
    }

    /// The `declaration_list` holding the members.
    fn body(&self) -> Option<&SyntaxNode> {
        self.node.body()
    }

    /// Named members of the body, comments included.
    fn body_members(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.body().into_iter().flat_map(SyntaxNode::named_children)
    }

    // ── Source metadata ────────────────────────────────────────────────

    /// Reformatted doc comment, or an empty string.
    pub fn doc_comment(&self) -> String {
        self.doc_comment
            .as_deref()
            .map(reformat_doc_comment)
            .unwrap_or_default()
    }

    /// One-based, or `-1` when unknown.
    pub fn start_line(&self) -> i64 {
        self.node
            .span()
            .and_then(|s| i64::try_from(s.start_line).ok())
            .unwrap_or(-1)
    }

    /// One-based, or `-1` when unknown.
    pub fn end_line(&self) -> i64 {
        self.node
            .span()
            .and_then(|s| i64::try_from(s.end_line).ok())
            .unwrap_or(-1)
    }

    /// Path of the defining file, if it came from disk.
    pub fn file_name(&self) -> Option<&std::path::Path> {
        self.located.origin()
    }

    /// Source the declaration was found in.
    pub const fn located_source(&self) -> &Rc<LocatedSource> {
        &self.located
    }

    /// The whole retained declaration node.
    pub const fn ast(&self) -> &SyntaxNode {
        &self.node
    }
}

impl fmt::Debug for ReflectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionClass")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("origin", &self.located.origin_label())
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

/// Walk the body once, remembering where each method sits and its doc comment.
fn index_methods(node: &SyntaxNode) -> Vec<MethodEntry> {
    let Some(body) = node.body() else {
        return Vec::new();
    };

    let mut tracker = DocCommentTracker::default();
    let mut entries = Vec::new();
    for (index, member) in body.children().iter().enumerate() {
        if !member.is_named() {
            continue;
        }
        let doc_comment = tracker.observe(member.kind(), || member.text());
        if member.kind() != "method_declaration" {
            continue;
        }
        let Some(name) = member.child_by_field("name").and_then(SyntaxNode::leaf_text) else {
            continue;
        };
        entries.push(MethodEntry {
            doc_comment,
            index,
            lowercase_name: name.to_ascii_lowercase(),
        });
    }
    entries
}

/// `NAME = value` of a constant element or enum case.
fn name_and_value(node: &SyntaxNode) -> Option<(String, String)> {
    let name = node.child_of_kind("name")?.compact_text();
    let value = node
        .named_children()
        .filter(|c| c.kind() != "name")
        .last()
        .map(|v| StandardPrinter.print_statements(&[v]))
        .unwrap_or_default();
    Some((name, value))
}
