//! Serializable summaries of descriptors and their plain-text rendering.

use std::fmt::Write as _;

use serde::Serialize;

use phpreflect::{
    ClassKind, Error, Reflection, ReflectionClass, ReflectionFunction, ReflectionParameter,
    Visibility,
};

// ── Summaries ──────────────────────────────────────────────────────────

/// Where a declaration lives.
#[derive(Debug, Serialize)]
pub struct LocationReport {
    /// One-based, or `-1`.
    pub end_line: i64,
    /// Defining file, if it came from disk.
    pub file: Option<String>,
    /// Served from a bundled stub.
    pub internal: bool,
    /// One-based, or `-1`.
    pub start_line: i64,
}

/// Function facts derived from its body and doc comment.
#[derive(Debug, Serialize)]
pub struct FunctionFlags {
    /// `@deprecated` in the doc comment.
    pub deprecated: bool,
    /// Contains a `yield`.
    pub generator: bool,
    /// Declared with `&`.
    pub returns_reference: bool,
}

/// Everything the `function` command reports.
#[derive(Debug, Serialize)]
pub struct FunctionReport {
    /// Body rendered by the standard printer.
    pub body: String,
    /// Reformatted doc comment, or empty.
    pub doc_comment: String,
    /// Facts from the body and doc comment.
    #[serde(flatten)]
    pub flags: FunctionFlags,
    /// Where it is declared.
    #[serde(flatten)]
    pub location: LocationReport,
    /// Qualified name.
    pub name: String,
    /// Enclosing namespace, or empty.
    pub namespace: String,
    /// Parameters in order.
    pub parameters: Vec<ParameterReport>,
    /// Count of non-optional parameters.
    pub required_parameters: usize,
    /// Declared return type.
    pub return_type: Option<String>,
    /// Name as declared.
    pub short_name: String,
    /// Has a variadic parameter.
    pub variadic: bool,
}

/// How a parameter is passed.
#[derive(Debug, Serialize)]
pub struct ParameterFlags {
    /// Declared with `&`.
    pub by_reference: bool,
    /// Constructor-promoted property.
    pub promoted: bool,
    /// `...$rest`.
    pub variadic: bool,
}

/// One parameter of a function or method.
#[derive(Debug, Serialize)]
pub struct ParameterReport {
    /// Default expression rendered as PHP.
    pub default: Option<String>,
    /// Passing mode.
    #[serde(flatten)]
    pub flags: ParameterFlags,
    /// Name without `$`.
    pub name: String,
    /// Result of the optionality scan.
    pub optional: bool,
    /// Zero-based.
    pub position: usize,
    /// Declared type.
    pub type_hint: Option<String>,
}

/// One method of a class.
#[derive(Debug, Serialize)]
pub struct MethodReport {
    /// Explicitly abstract or declared on an interface.
    pub is_abstract: bool,
    /// `final` method.
    pub is_final: bool,
    /// `static` method.
    pub is_static: bool,
    /// Name as declared.
    pub name: String,
    /// Parameters in order.
    pub parameters: Vec<ParameterReport>,
    /// Declared return type.
    pub return_type: Option<String>,
    /// Declared or implied visibility.
    pub visibility: Option<Visibility>,
}

/// Everything the `class` command reports.
#[derive(Debug, Serialize)]
pub struct ClassReport {
    /// Class constants and enum cases.
    pub constants: Vec<ConstantReport>,
    /// Reformatted doc comment, or empty.
    pub doc_comment: String,
    /// Directly implemented (or extended, for interfaces) interfaces.
    pub interfaces: Vec<String>,
    /// Explicitly abstract or an interface.
    pub is_abstract: bool,
    /// `final` class.
    pub is_final: bool,
    /// Class-like keyword.
    pub kind: ClassKind,
    /// Where it is declared.
    #[serde(flatten)]
    pub location: LocationReport,
    /// Methods in declaration order.
    pub methods: Vec<MethodReport>,
    /// Qualified name.
    pub name: String,
    /// Enclosing namespace, or empty.
    pub namespace: String,
    /// `extends` target.
    pub parent: Option<String>,
    /// Declared and promoted property names.
    pub properties: Vec<String>,
}

/// A class constant or enum case.
#[derive(Debug, Serialize)]
pub struct ConstantReport {
    /// Constant name.
    pub name: String,
    /// Value rendered as PHP.
    pub value: String,
}

/// Summarize a function for output.
pub fn function_report(function: &ReflectionFunction) -> FunctionReport {
    FunctionReport {
        body: function.body_code(None),
        doc_comment: function.doc_comment(),
        flags: FunctionFlags {
            deprecated: function.is_deprecated(),
            generator: function.is_generator(),
            returns_reference: function.returns_reference(),
        },
        location: LocationReport {
            end_line: function.end_line(),
            file: function.file_name().map(|p| p.display().to_string()),
            internal: function.is_internal(),
            start_line: function.start_line(),
        },
        name: function.name(),
        namespace: function.namespace_name(),
        parameters: function.parameters().iter().map(parameter_report).collect(),
        required_parameters: function.number_of_required_parameters(),
        return_type: function.return_type(),
        short_name: function.short_name().to_string(),
        variadic: function.is_variadic(),
    }
}

/// Summarize one parameter.
fn parameter_report(parameter: &ReflectionParameter) -> ParameterReport {
    ParameterReport {
        default: parameter.default_value_code(),
        flags: ParameterFlags {
            by_reference: parameter.is_passed_by_reference(),
            promoted: parameter.is_promoted(),
            variadic: parameter.is_variadic(),
        },
        name: parameter.name().to_string(),
        optional: parameter.is_optional(),
        position: parameter.position(),
        type_hint: parameter.type_hint().map(String::from),
    }
}

/// Summarize one method.
fn method_report(method: &ReflectionFunction) -> MethodReport {
    MethodReport {
        is_abstract: method.is_abstract(),
        is_final: method.is_final(),
        is_static: method.is_static(),
        name: method.short_name().to_string(),
        parameters: method.parameters().iter().map(parameter_report).collect(),
        return_type: method.return_type(),
        visibility: method.visibility(),
    }
}

/// Summarize a class-like for output.
pub fn class_report(class: &ReflectionClass) -> ClassReport {
    ClassReport {
        constants: class
            .constants()
            .into_iter()
            .map(|(name, value)| ConstantReport { name, value })
            .collect(),
        doc_comment: class.doc_comment(),
        interfaces: class.interface_names(),
        is_abstract: class.is_abstract(),
        is_final: class.is_final(),
        kind: class.kind(),
        location: LocationReport {
            end_line: class.end_line(),
            file: class.file_name().map(|p| p.display().to_string()),
            internal: class.is_internal(),
            start_line: class.start_line(),
        },
        methods: class.methods().iter().map(method_report).collect(),
        name: class.name(),
        namespace: class.namespace_name(),
        parent: class.parent_class_name(),
        properties: class.property_names(),
    }
}

// ── Output ─────────────────────────────────────────────────────────────

/// Pretty-print `value` as JSON on stdout.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print qualified names, one per line or as a JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn print_names(reflections: &[Reflection], json: bool) -> Result<(), Error> {
    let names: Vec<String> = reflections.iter().map(Reflection::name).collect();
    if json {
        return print_json(&names);
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Plain-text form of a function report.
pub fn render_function(report: &FunctionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "function {}", report.name);
    write_location(&mut out, &report.location);
    if !report.namespace.is_empty() {
        let _ = writeln!(out, "  namespace: {}", report.namespace);
    }

    let flags: Vec<&str> = [
        (report.flags.generator, "generator"),
        (report.variadic, "variadic"),
        (report.flags.returns_reference, "returns-reference"),
        (report.flags.deprecated, "deprecated"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect();
    if !flags.is_empty() {
        let _ = writeln!(out, "  flags:     {}", flags.join(", "));
    }
    if let Some(return_type) = &report.return_type {
        let _ = writeln!(out, "  returns:   {return_type}");
    }

    write_parameters(&mut out, &report.parameters, "  ");
    write_block(&mut out, "doc", &report.doc_comment);
    write_block(&mut out, "body", &report.body);
    out
}

/// Plain-text form of a class report.
pub fn render_class(report: &ClassReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", report.kind.as_str(), report.name);
    write_location(&mut out, &report.location);
    if let Some(parent) = &report.parent {
        let _ = writeln!(out, "  extends:    {parent}");
    }
    if !report.interfaces.is_empty() {
        let _ = writeln!(out, "  implements: {}", report.interfaces.join(", "));
    }

    if !report.constants.is_empty() {
        let _ = writeln!(out, "  constants:");
        for constant in &report.constants {
            let _ = writeln!(out, "    {} = {}", constant.name, constant.value);
        }
    }
    if !report.properties.is_empty() {
        let _ = writeln!(out, "  properties:");
        for property in &report.properties {
            let _ = writeln!(out, "    ${property}");
        }
    }
    if !report.methods.is_empty() {
        let _ = writeln!(out, "  methods:");
        for method in &report.methods {
            let _ = writeln!(out, "    {}", method_signature(method));
        }
    }
    write_block(&mut out, "doc", &report.doc_comment);
    out
}

/// `source:` line naming the file or a bracketed origin label.
fn write_location(out: &mut String, location: &LocationReport) {
    let origin = match (location.file.as_deref(), location.internal) {
        (Some(file), _) => file,
        (None, true) => "<internal>",
        (None, false) => "<evaluated>",
    };
    let (start, end) = (location.start_line, location.end_line);
    let _ = writeln!(out, "  source:    {origin} (lines {start}-{end})");
}

/// Numbered parameter lines with their requirement.
fn write_parameters(out: &mut String, parameters: &[ParameterReport], indent: &str) {
    if parameters.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}parameters:");
    for parameter in parameters {
        let requirement = if parameter.optional { "optional" } else { "required" };
        let _ = writeln!(
            out,
            "{indent}  #{} {} ({requirement})",
            parameter.position,
            parameter_signature(parameter)
        );
    }
}

/// Indented multi-line section; nothing when `text` is empty.
fn write_block(out: &mut String, label: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {label}:");
    for line in text.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

/// `type &...$name = default` as PHP would declare it.
fn parameter_signature(parameter: &ParameterReport) -> String {
    let mut signature = String::new();
    if let Some(type_hint) = &parameter.type_hint {
        let _ = write!(signature, "{type_hint} ");
    }
    if parameter.flags.by_reference {
        signature.push('&');
    }
    if parameter.flags.variadic {
        signature.push_str("...");
    }
    let _ = write!(signature, "${}", parameter.name);
    if let Some(default) = &parameter.default {
        let _ = write!(signature, " = {default}");
    }
    signature
}

/// One-line method declaration with its modifiers.
fn method_signature(method: &MethodReport) -> String {
    let mut modifiers = Vec::new();
    if method.is_abstract {
        modifiers.push("abstract");
    }
    if method.is_final {
        modifiers.push("final");
    }
    modifiers.push(match method.visibility {
        Some(Visibility::Private) => "private",
        Some(Visibility::Protected) => "protected",
        Some(Visibility::Public) | None => "public",
    });
    if method.is_static {
        modifiers.push("static");
    }

    let parameters: Vec<String> = method.parameters.iter().map(parameter_signature).collect();
    let mut signature = format!("{} function {}({})", modifiers.join(" "), method.name, parameters.join(", "));
    if let Some(return_type) = &method.return_type {
        let _ = write!(signature, ": {return_type}");
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpreflect::{Reflector, StringSourceLocator};
    use pretty_assertions::assert_eq;

    #[test]
    fn function_text_lists_parameters_and_body() {
        let reflector = Reflector::new(Box::new(
            StringSourceLocator::new("<?php\nnamespace App;\nfunction greet(string $name, int $times = 2): string {\n    return $name;\n}")
                .unwrap(),
        ));
        let function = reflector.reflect_function("App\\greet").unwrap();
        let text = render_function(&function_report(&function));

        assert_eq!(
            text,
            "function App\\greet\n  source:    <evaluated> (lines 3-5)\n  namespace: App\n  returns:   string\n  parameters:\n    #0 string $name (required)\n    #1 int $times = 2 (optional)\n  body:\n    return $name;\n"
        );
    }

    #[test]
    fn class_text_lists_members() {
        let reflector = Reflector::new(Box::new(
            StringSourceLocator::new(
                "<?php\nfinal class Point implements JsonSerializable {\n    const ORIGIN = 0;\n    private int $x;\n    public static function make(int $x): Point { return new Point(); }\n}",
            )
            .unwrap(),
        ));
        let class = reflector.reflect_class("Point").unwrap();
        let text = render_class(&class_report(&class));

        assert_eq!(
            text,
            "class Point\n  source:    <evaluated> (lines 2-6)\n  implements: JsonSerializable\n  constants:\n    ORIGIN = 0\n  properties:\n    $x\n  methods:\n    public static function make(int $x): Point\n"
        );
    }
}
