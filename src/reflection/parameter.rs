//! Descriptors for function and method parameters.
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::printer::{PrettyPrinter as _, StandardPrinter};
use crate::reflection::{Namespace, ReflectionClass};
use crate::reflector::Reflector;
use crate::syntax::SyntaxNode;

/// Type names that never refer to a class.
const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "string", "true", "void",
];

/// Facts about the declaring function shared by all of its parameters.
#[derive(Debug)]
pub(crate) struct ParameterContext {
    /// Qualified name of the declaring class, for methods.
    pub(crate) declaring_class: Option<String>,
    /// Name reported by `declaring_function_name`.
    pub(crate) function_name: String,
    /// Namespace relative type hints resolve against.
    pub(crate) namespace: Namespace,
}

/// Which parameter declaration produced the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterKind {
    /// An ordinary parameter.
    Plain,
    /// A constructor parameter that also declares a property.
    Promoted,
    /// `...$rest`.
    Variadic,
}

/// One parameter of a function or method, snapshotted from its declaration.
pub struct ReflectionParameter {
    /// Declared with `&`.
    by_reference: bool,
    /// Facts about the declaring function.
    context: Rc<ParameterContext>,
    /// Default expression, if any.
    default_value: Option<SyntaxNode>,
    /// Declaration shape.
    kind: ParameterKind,
    /// Name without `$`.
    name: String,
    /// Result of the optionality scan.
    optional: bool,
    /// Zero-based.
    position: usize,
    /// Used to reflect the hinted class.
    reflector: Rc<Reflector>,
    /// Declared type, whitespace removed.
    type_hint: Option<String>,
}

impl ParameterKind {
    /// Map a tree-sitter parameter kind.
    fn from_node_kind(kind: &str) -> Self {
        match kind {
            "property_promotion_parameter" => Self::Promoted,
            "variadic_parameter" => Self::Variadic,
            _ => Self::Plain,
        }
    }
}

impl ReflectionParameter {
    /// Snapshot one parameter declaration node.
    pub(crate) fn new(
        reflector: Rc<Reflector>,
        context: Rc<ParameterContext>,
        node: &SyntaxNode,
        position: usize,
        optional: bool,
    ) -> Self {
        // Promoted parameters may spell the name as a `by_ref` node (`&$x`).
        let name_node = node.child_by_field("name");
        let by_reference = node.has_child_of_kind("reference_modifier")
            || name_node.is_some_and(|n| n.kind() == "by_ref");
        let name = name_node
            .map(SyntaxNode::compact_text)
            .unwrap_or_default()
            .trim_start_matches(['&', '$'])
            .to_string();

        Self {
            by_reference,
            context,
            default_value: node.child_by_field("default_value").cloned(),
            kind: ParameterKind::from_node_kind(node.kind()),
            name,
            optional,
            position,
            reflector,
            type_hint: node.child_by_field("type").map(SyntaxNode::compact_text),
        }
    }

    /// Name without the leading `$`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based position in the parameter list.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Whether a caller may omit this parameter; see the optionality scan
    /// in `ReflectionFunction`.
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Declares a default expression.
    pub const fn is_default_value_available(&self) -> bool {
        self.default_value.is_some()
    }

    /// The default expression rendered as PHP, e.g. `[]` or `self::LIMIT`.
    pub fn default_value_code(&self) -> Option<String> {
        self.default_value
            .as_ref()
            .map(|node| StandardPrinter.print_statements(&[node]))
    }

    /// Collects the remaining arguments, as in `...$rest`.
    pub fn is_variadic(&self) -> bool {
        self.kind == ParameterKind::Variadic
    }

    /// Declared with `&`.
    pub const fn is_passed_by_reference(&self) -> bool {
        self.by_reference
    }

    /// Constructor parameter that also declares a property.
    pub fn is_promoted(&self) -> bool {
        self.kind == ParameterKind::Promoted
    }

    /// Declared type as written, e.g. `?int` or `Foo|null`.
    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    /// Untyped, nullable, `mixed`, a `null` union member, or a `null` default.
    pub fn allows_null(&self) -> bool {
        let Some(hint) = self.type_hint.as_deref() else {
            return true;
        };
        let nullable_type = hint.starts_with('?')
            || hint
                .split('|')
                .any(|t| t.eq_ignore_ascii_case("null") || t.eq_ignore_ascii_case("mixed"));
        let null_default = self
            .default_value
            .as_ref()
            .is_some_and(|d| d.compact_text().eq_ignore_ascii_case("null"));
        nullable_type || null_default
    }

    /// Hinted exactly as `array` (or `?array`).
    pub fn is_array(&self) -> bool {
        self.single_type().is_some_and(|t| t.eq_ignore_ascii_case("array"))
    }

    /// Hinted exactly as `callable` (or `?callable`).
    pub fn is_callable(&self) -> bool {
        self.single_type().is_some_and(|t| t.eq_ignore_ascii_case("callable"))
    }

    /// Qualified name of the declaring function (short name for methods).
    pub fn declaring_function_name(&self) -> &str {
        &self.context.function_name
    }

    /// Qualified name of the declaring class, for method parameters.
    pub fn declaring_class_name(&self) -> Option<&str> {
        self.context.declaring_class.as_deref()
    }

    /// Fully qualified class name the type hint refers to, if it names one.
    ///
    /// `self` and `static` mean the declaring class; a leading `\` is
    /// absolute; anything else is relative to the declaring namespace.
    /// `use` imports are not consulted.
    pub fn class_name(&self) -> Option<String> {
        let written = self.single_type()?;
        if BUILTIN_TYPES.iter().any(|b| b.eq_ignore_ascii_case(written)) {
            return None;
        }
        if written.eq_ignore_ascii_case("self") || written.eq_ignore_ascii_case("static") {
            return self.context.declaring_class.clone();
        }
        Some(self.context.namespace.resolve(written))
    }

    /// Reflect the class named by the type hint through the reflector.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdentifierNotFound` if the hinted class cannot be
    /// located, or any error the lookup raises.
    pub fn class(&self) -> Result<Option<ReflectionClass>, Error> {
        self.class_name()
            .map(|name| self.reflector.reflect_class(&name))
            .transpose()
    }

    /// The hint without a nullable marker, unless it is a union or intersection.
    fn single_type(&self) -> Option<&str> {
        let hint = self.type_hint.as_deref()?.trim_start_matches('?');
        if hint.contains(['|', '&', '(']) {
            return None;
        }
        Some(hint)
    }
}

impl fmt::Debug for ReflectionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionParameter")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("optional", &self.optional)
            .field("type_hint", &self.type_hint)
            .finish_non_exhaustive()
    }
}
