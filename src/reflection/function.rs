//! Descriptors for free functions and methods.
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::grammar;
use crate::located::LocatedSource;
use crate::printer::{PrettyPrinter, StandardPrinter};
use crate::reflection::class::ClassKind;
use crate::reflection::parameter::{ParameterContext, ReflectionParameter};
use crate::reflection::{Namespace, ReflectionClass};
use crate::reflector::Reflector;
use crate::syntax::{SyntaxNode, reformat_doc_comment};

/// Node kinds a `ReflectionFunction` can be built from.
const FUNCTION_KINDS: &[&str] = &["function_definition", "method_declaration"];

/// Node kinds accepted as a closure-shaped replacement body.
const CLOSURE_KINDS: &[&str] = &["anonymous_function", "anonymous_function_creation_expression"];

/// Node kinds that declare a parameter inside `formal_parameters`.
const PARAMETER_KINDS: &[&str] = &[
    "property_promotion_parameter",
    "simple_parameter",
    "variadic_parameter",
];

/// Where a replacement body comes from.
#[derive(Debug, Clone)]
pub enum BodySource {
    /// An already-parsed closure whose statements are lifted out.
    Closure(SyntaxNode),
    /// PHP statements without an opening tag, e.g. `return 1;`.
    Code(String),
}

/// Member visibility of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `private`.
    Private,
    /// `protected`.
    Protected,
    /// `public`, written or implied.
    Public,
}

/// Class-side facts for a method.
#[derive(Debug, Clone)]
pub(crate) struct MethodContext {
    /// Kind of the declaring class-like; interface methods are abstract.
    pub(crate) class_kind: ClassKind,
    /// Fully qualified name of the declaring class.
    pub(crate) class_name: String,
}

/// A free function or a method, built around its owned declaration node.
///
/// Everything except the parameter optionality flags is derived from the
/// node on demand, so a `replace_body` is visible to every later query.
pub struct ReflectionFunction {
    /// Raw `/** ... */` text preceding the declaration.
    doc_comment: Option<String>,
    /// Source the declaration was found in.
    located: Rc<LocatedSource>,
    /// Class-side facts; `None` for free functions.
    method: Option<MethodContext>,
    /// Enclosing namespace of the declaration.
    namespace: Namespace,
    /// Owned declaration node, body included.
    node: SyntaxNode,
    /// Computed once at construction; parameters are never mutated.
    optional_flags: Vec<bool>,
    /// Used for class lookups from methods and parameter types.
    reflector: Rc<Reflector>,
}

impl BodySource {
    /// Replacement statements given as PHP text.
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    /// Parse closure text such as `function () { return 1; }`.
    ///
    /// If the text holds no closure the parsed fragment is kept anyway and
    /// `replace_body` rejects it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailure` if the text does not parse.
    pub fn closure(code: &str) -> Result<Self, Error> {
        let text = format!("<?php {code};");
        let parsed = grammar::parse(&text, "<closure>")?;
        let program = SyntaxNode::from_tree_sitter(parsed.tree().root_node(), &text);

        let closure = program
            .descendants()
            .find(|n| CLOSURE_KINDS.contains(&n.kind()))
            .cloned();
        Ok(Self::Closure(closure.unwrap_or(program)))
    }
}

impl ReflectionFunction {
    /// Build from a `function_definition` or `method_declaration` node.
    /// Returns `None` for any other node kind.
    pub(crate) fn new(
        reflector: Rc<Reflector>,
        node: SyntaxNode,
        located: Rc<LocatedSource>,
        namespace: Namespace,
        doc_comment: Option<String>,
        method: Option<MethodContext>,
    ) -> Option<Self> {
        if !FUNCTION_KINDS.contains(&node.kind()) {
            return None;
        }

        let has_default: Vec<bool> = parameter_nodes(&node)
            .map(|p| p.child_by_field("default_value").is_some())
            .collect();

        Some(Self {
            doc_comment,
            located,
            method,
            namespace,
            optional_flags: optional_flags(&has_default),
            node,
            reflector,
        })
    }

    // ── Names ──────────────────────────────────────────────────────────

    /// Qualified name for functions (`A\B\foo`); methods report their short name.
    pub fn name(&self) -> String {
        if self.is_method() || !self.in_namespace() {
            return self.short_name().to_string();
        }
        self.namespace.qualify(self.short_name())
    }

    /// Name as written in the declaration.
    pub fn short_name(&self) -> &str {
        self.node
            .child_by_field("name")
            .and_then(SyntaxNode::leaf_text)
            .unwrap_or("")
    }

    /// `A\B` for `A\B\foo`; empty in the global namespace.
    pub fn namespace_name(&self) -> String {
        self.namespace.name()
    }

    /// Namespace segments, outermost first.
    pub fn namespace_path(&self) -> &[String] {
        self.namespace.segments()
    }

    /// False for the global namespace, including an explicit `namespace { }` block.
    pub fn in_namespace(&self) -> bool {
        !self.namespace.is_global()
    }

    // ── Parameters ─────────────────────────────────────────────────────

    /// Parameter descriptors in declaration order.
    pub fn parameters(&self) -> Vec<ReflectionParameter> {
        let context = Rc::new(ParameterContext {
            declaring_class: self.method.as_ref().map(|m| m.class_name.clone()),
            function_name: self.name(),
            namespace: self.namespace.clone(),
        });

        parameter_nodes(&self.node)
            .zip(&self.optional_flags)
            .enumerate()
            .map(|(position, (node, &optional))| {
                ReflectionParameter::new(
                    Rc::clone(&self.reflector),
                    Rc::clone(&context),
                    node,
                    position,
                    optional,
                )
            })
            .collect()
    }

    /// Parameter by name, with or without the leading `$`.
    pub fn parameter(&self, name: &str) -> Option<ReflectionParameter> {
        let name = name.trim_start_matches('$');
        self.parameters().into_iter().find(|p| p.name() == name)
    }

    /// Count of declared parameters.
    pub fn number_of_parameters(&self) -> usize {
        self.optional_flags.len()
    }

    /// Count of parameters that are not optional.
    pub fn number_of_required_parameters(&self) -> usize {
        self.optional_flags.iter().filter(|&&optional| !optional).count()
    }

    /// True iff any parameter is variadic. Always false for internal code.
    pub fn is_variadic(&self) -> bool {
        if self.is_internal() {
            return false;
        }
        parameter_nodes(&self.node).any(|p| p.kind() == "variadic_parameter")
    }

    // ── Flags ──────────────────────────────────────────────────────────

    /// True iff a `yield` appears anywhere beneath the declaration.
    /// Always false for internal code.
    pub fn is_generator(&self) -> bool {
        if self.is_internal() {
            return false;
        }
        self.node.any(&|n| n.kind() == "yield_expression")
    }

    /// Declared with `&`, as in `function &foo()`.
    pub fn returns_reference(&self) -> bool {
        self.node.has_child_of_kind("reference_modifier")
    }

    /// Declared return type, e.g. `?int` or `\Foo\Bar`.
    pub fn return_type(&self) -> Option<String> {
        self.node
            .child_by_field("return_type")
            .map(SyntaxNode::compact_text)
    }

    /// Built from a closure node. Closures cannot be located as
    /// declarations, so this holds only for hand-built descriptors.
    pub fn is_closure(&self) -> bool {
        CLOSURE_KINDS.contains(&self.node.kind())
    }

    /// An `@deprecated` tag in the doc comment. Always false for internal code.
    pub fn is_deprecated(&self) -> bool {
        if self.is_internal() {
            return false;
        }
        self.doc_comment
            .as_deref()
            .is_some_and(|doc| doc.contains("@deprecated"))
    }

    /// Declared in a bundled stub rather than user code.
    pub fn is_internal(&self) -> bool {
        self.located.is_internal()
    }

    /// Opposite of `is_internal`.
    pub fn is_user_defined(&self) -> bool {
        !self.is_internal()
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

    // ── Body ───────────────────────────────────────────────────────────

    /// Statements of the body; empty for bodiless abstract methods.
    pub fn body_statements(&self) -> Vec<&SyntaxNode> {
        self.node
            .body()
            .map(|body| body.statements().collect())
            .unwrap_or_default()
    }

    /// The body rendered as PHP, with `StandardPrinter` unless another is given.
    pub fn body_code(&self, printer: Option<&dyn PrettyPrinter>) -> String {
        let statements = self.body_statements();
        printer.map_or_else(
            || StandardPrinter.print_statements(&statements),
            |printer| printer.print_statements(&statements),
        )
    }

    /// Overwrite the body statements in place. Line span and doc comment
    /// keep describing the original declaration.
    ///
    /// # Errors
    ///
    /// Returns `Error::BodyReplacement` if the code does not parse, the
    /// fragment is not a closure, no statements come out of it, or the
    /// declaration has no body to replace.
    pub fn replace_body(&mut self, source: BodySource) -> Result<(), Error> {
        let statements = match source {
            BodySource::Closure(closure) => self.statements_from_closure(&closure)?,
            BodySource::Code(code) => self.statements_from_code(&code)?,
        };

        if statements.is_empty() {
            return Err(self.body_error("replacement contains no statements"));
        }
        if !self.node.replace_body_statements(statements) {
            return Err(self.body_error("declaration has no body"));
        }

        tracing::debug!(function = %self.name(), "replaced body");
        Ok(())
    }

    /// Statements of `code` parsed as a standalone program.
    fn statements_from_code(&self, code: &str) -> Result<Vec<SyntaxNode>, Error> {
        let text = format!("<?php {code}");
        let parsed = grammar::parse(&text, "<replacement>")
            .map_err(|e| self.body_error(&format!("replacement does not parse: {e}")))?;
        let program = SyntaxNode::from_tree_sitter(parsed.tree().root_node(), &text);
        Ok(program.statements().cloned().collect())
    }

    /// Statements lifted out of a closure's body.
    fn statements_from_closure(&self, closure: &SyntaxNode) -> Result<Vec<SyntaxNode>, Error> {
        if !CLOSURE_KINDS.contains(&closure.kind()) {
            return Err(self.body_error(&format!("expected a closure, got `{}`", closure.kind())));
        }
        let body = closure
            .body()
            .ok_or_else(|| self.body_error("closure has no body"))?;
        Ok(body.statements().cloned().collect())
    }

    /// A `BodyReplacement` error naming this function.
    fn body_error(&self, reason: &str) -> Error {
        Error::BodyReplacement {
            function: self.name(),
            reason: reason.to_string(),
        }
    }

    // ── Methods ────────────────────────────────────────────────────────

    /// Declared inside a class-like.
    pub const fn is_method(&self) -> bool {
        self.method.is_some()
    }

    /// Qualified name of the class declaring this method.
    pub fn declaring_class_name(&self) -> Option<&str> {
        self.method.as_ref().map(|m| m.class_name.as_str())
    }

    /// Look the declaring class up again through the reflector.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdentifierNotFound` if the class can no longer be
    /// located, or any error the lookup raises.
    pub fn declaring_class(&self) -> Result<Option<ReflectionClass>, Error> {
        self.declaring_class_name()
            .map(|name| self.reflector.reflect_class(name))
            .transpose()
    }

    /// Public unless a visibility modifier says otherwise. `None` for functions.
    pub fn visibility(&self) -> Option<Visibility> {
        self.method.as_ref()?;
        let modifier = self
            .node
            .child_of_kind("visibility_modifier")
            .map(SyntaxNode::text)
            .unwrap_or_default()
            .to_ascii_lowercase();
        Some(match modifier.as_str() {
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            _ => Visibility::Public,
        })
    }

    /// A `static` method.
    pub fn is_static(&self) -> bool {
        self.is_method() && self.node.has_child_of_kind("static_modifier")
    }

    /// Explicitly abstract, or declared on an interface.
    pub fn is_abstract(&self) -> bool {
        self.method.as_ref().is_some_and(|method| {
            method.class_kind == ClassKind::Interface
                || self.node.has_child_of_kind("abstract_modifier")
        })
    }

    /// A `final` method.
    pub fn is_final(&self) -> bool {
        self.is_method() && self.node.has_child_of_kind("final_modifier")
    }

    /// Named `__construct`, in any case.
    pub fn is_constructor(&self) -> bool {
        self.is_method() && self.short_name().eq_ignore_ascii_case("__construct")
    }
}

impl fmt::Debug for ReflectionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionFunction")
            .field("name", &self.name())
            .field("declaring_class", &self.declaring_class_name())
            .field("origin", &self.located.origin_label())
            .field("start_line", &self.start_line())
            .finish_non_exhaustive()
    }
}

/// Parameter declarations in order.
pub(crate) fn parameter_nodes(node: &SyntaxNode) -> impl Iterator<Item = &SyntaxNode> {
    node.child_by_field("parameters")
        .into_iter()
        .flat_map(SyntaxNode::children)
        .filter(|c| PARAMETER_KINDS.contains(&c.kind()))
}

/// Right-to-left optionality scan: a parameter is optional only when it and
/// every parameter after it has a default. One required parameter makes all
/// parameters to its left required, defaults or not.
pub(crate) fn optional_flags(has_default: &[bool]) -> Vec<bool> {
    let mut flags = vec![false; has_default.len()];
    let mut optional = true;
    for (flag, &default) in flags.iter_mut().zip(has_default).rev() {
        if !default {
            optional = false;
        }
        *flag = optional;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_parameter_poisons_everything_before_it() {
        assert_eq!(optional_flags(&[false, true, false]), [false, false, false]);
        assert_eq!(optional_flags(&[false, true, true]), [false, true, true]);
        assert_eq!(optional_flags(&[true, false, true]), [false, false, true]);
        assert_eq!(optional_flags(&[]), Vec::<bool>::new());
    }

    #[test]
    fn optional_iff_every_later_parameter_has_a_default() {
        for len in 0..=8_u32 {
            for pattern in 0..(1_u32 << len) {
                let has_default: Vec<bool> = (0..len).map(|bit| pattern & (1 << bit) != 0).collect();
                let flags = optional_flags(&has_default);
                for (i, &flag) in flags.iter().enumerate() {
                    let expected = has_default[i..].iter().all(|&d| d);
                    assert_eq!(flag, expected, "pattern {has_default:?}, index {i}");
                }
            }
        }
    }

    #[test]
    fn closure_source_finds_the_closure_node() {
        let BodySource::Closure(node) = BodySource::closure("function () { return 2; }").unwrap() else {
            panic!("expected closure source");
        };
        assert!(CLOSURE_KINDS.contains(&node.kind()));
        assert_eq!(node.body().unwrap().statements().count(), 1);
    }
}
