use std::rc::Rc;

use phpreflect::{
    AggregateSourceLocator, BodySource, ClassKind, Error, EvaledCodeRegistry,
    EvaledCodeSourceLocator, Identifier, IdentifierKind, InternalSourceLocator, Reflection,
    Reflector, SingleFileSourceLocator, StringSourceLocator, Visibility,
};
use pretty_assertions::assert_eq;

fn reflector(code: &str) -> Rc<Reflector> {
    Reflector::new(Box::new(StringSourceLocator::new(code).unwrap()))
}

// ── Naming ─────────────────────────────────────────────────────────────

#[test]
fn global_function_name_equals_short_name() {
    let function = reflector("<?php function foo() {}").reflect_function("foo").unwrap();
    assert_eq!(function.name(), "foo");
    assert_eq!(function.short_name(), "foo");
    assert!(!function.in_namespace());
    assert!(function.namespace_path().is_empty());
}

#[test]
fn braced_namespace_qualifies_name() {
    let function = reflector("<?php namespace A\\B { function foo() {} }")
        .reflect_function("A\\B\\foo")
        .unwrap();
    assert_eq!(function.name(), "A\\B\\foo");
    assert_eq!(function.short_name(), "foo");
    assert_eq!(function.namespace_name(), "A\\B");
    assert_eq!(function.namespace_path(), ["A", "B"]);
    assert!(function.in_namespace());
}

#[test]
fn explicit_global_namespace_block_is_not_a_namespace() {
    let function = reflector("<?php namespace { function foo() {} }")
        .reflect_function("foo")
        .unwrap();
    assert!(!function.in_namespace());
    assert_eq!(function.name(), "foo");
}

#[test]
fn reflecting_twice_gives_equal_descriptors() {
    let reflector = reflector("<?php\n/** Doc. */\nfunction foo($a, $b = 1) { return $a + $b; }");
    let first = reflector.reflect_function("foo").unwrap();
    let second = reflector.reflect_function("foo").unwrap();

    assert_eq!(first.name(), second.name());
    assert_eq!(first.start_line(), second.start_line());
    assert_eq!(first.end_line(), second.end_line());
    assert_eq!(first.doc_comment(), second.doc_comment());
    assert_eq!(first.body_code(None), second.body_code(None));
    assert_eq!(first.ast(), second.ast());
}

// ── Flags ──────────────────────────────────────────────────────────────

#[test]
fn deeply_nested_yield_makes_a_generator() {
    let reflector = reflector(
        "<?php\nfunction gen() { foreach ([1] as $x) { if ($x) { while (true) { yield $x; } } } }\nfunction plain() { foreach ([1] as $x) { if ($x) { return $x; } } }\nfunction delegating() { yield from other(); }",
    );
    assert!(reflector.reflect_function("gen").unwrap().is_generator());
    assert!(!reflector.reflect_function("plain").unwrap().is_generator());
    assert!(reflector.reflect_function("delegating").unwrap().is_generator());
}

#[test]
fn optionality_follows_later_defaults() {
    let reflector = reflector("<?php\nfunction f($a, $b = 1, $c) {}\nfunction g($a, $b = 1, $c = 2) {}\nfunction h($a = 1, ...$rest) {}");

    let optional = |name: &str| -> Vec<bool> {
        reflector
            .reflect_function(name)
            .unwrap()
            .parameters()
            .iter()
            .map(|p| p.is_optional())
            .collect()
    };
    assert_eq!(optional("f"), [false, false, false]);
    assert_eq!(optional("g"), [false, true, true]);
    assert_eq!(optional("h"), [false, false]);

    let g = reflector.reflect_function("g").unwrap();
    assert_eq!(g.number_of_parameters(), 3);
    assert_eq!(g.number_of_required_parameters(), 1);
}

#[test]
fn parameter_details() {
    let function = reflector(
        "<?php namespace App; function run(?Job &$job, array $opts = [], callable $cb = null, int|string $key = self::KEY, \\Psr\\Log $log = null) {}",
    )
    .reflect_function("App\\run")
    .unwrap();
    let parameters = function.parameters();

    let job = &parameters[0];
    assert_eq!(job.name(), "job");
    assert!(job.is_passed_by_reference());
    assert!(job.allows_null());
    assert_eq!(job.class_name().as_deref(), Some("App\\Job"));
    assert_eq!(job.declaring_function_name(), "App\\run");

    let opts = &parameters[1];
    assert!(opts.is_array());
    assert_eq!(opts.default_value_code().as_deref(), Some("[]"));
    assert_eq!(opts.class_name(), None);

    let cb = &parameters[2];
    assert!(cb.is_callable());
    assert!(cb.allows_null());

    let key = &parameters[3];
    assert_eq!(key.type_hint(), Some("int|string"));
    assert_eq!(key.default_value_code().as_deref(), Some("self::KEY"));
    assert!(!key.allows_null());

    assert_eq!(parameters[4].class_name().as_deref(), Some("Psr\\Log"));
    assert!(function.parameter("$opts").is_some());
    assert!(function.parameter("missing").is_none());
}

#[test]
fn return_type_and_reference() {
    let function = reflector("<?php function &pick(array &$items): ?int { return $items[0]; }")
        .reflect_function("pick")
        .unwrap();
    assert!(function.returns_reference());
    assert_eq!(function.return_type().as_deref(), Some("?int"));
    assert!(!function.is_closure());
    assert!(function.is_user_defined());
}

// ── Lookup failures ────────────────────────────────────────────────────

#[test]
fn absent_name_is_not_found_rather_than_a_parse_error() {
    let reflector = Reflector::new(Box::new(
        AggregateSourceLocator::new()
            .with(InternalSourceLocator::new())
            .with(EvaledCodeSourceLocator::new(EvaledCodeRegistry::new())),
    ));
    let result = reflector.reflect(&Identifier::function("no_such_function"));
    assert!(matches!(result, Err(Error::IdentifierNotFound { .. })));
}

#[test]
fn unparseable_source_is_a_parse_failure() {
    let result = reflector("<?php function ( {").reflect_function("foo");
    assert!(matches!(result, Err(Error::ParseFailure { .. })));
}

#[test]
fn single_file_locator_rejects_bad_paths() {
    let dir = tempfile::tempdir().unwrap();
    for path in [dir.path().to_path_buf(), dir.path().join("missing.php")] {
        assert!(matches!(
            SingleFileSourceLocator::new(path),
            Err(Error::InvalidLocatorConfiguration { .. })
        ));
    }
}

// ── Bodies ─────────────────────────────────────────────────────────────

#[test]
fn replacing_a_generator_body() {
    let mut function = reflector("<?php\nfunction gen() {\n    yield 1;\n    yield 2;\n}")
        .reflect_function("gen")
        .unwrap();
    assert!(function.is_generator());
    assert_eq!(function.body_code(None), "yield 1;\nyield 2;");

    function.replace_body(BodySource::code("return 1;")).unwrap();

    assert_eq!(function.body_code(None), "return 1;");
    assert!(!function.is_generator());
    assert_eq!(function.start_line(), 2);
    assert_eq!(function.end_line(), 5);
}

#[test]
fn replacing_with_a_closure_body() {
    let mut function = reflector("<?php function f() { return 0; }").reflect_function("f").unwrap();
    let closure = BodySource::closure("function () { $x = 2; return $x * 3; }").unwrap();

    function.replace_body(closure).unwrap();

    assert_eq!(function.body_code(None), "$x = 2;\nreturn $x * 3;");
    assert_eq!(function.body_statements().len(), 2);
}

#[test]
fn invalid_replacements_are_rejected() {
    let mut function = reflector("<?php function f() { return 0; }").reflect_function("f").unwrap();

    assert!(matches!(
        function.replace_body(BodySource::code("")),
        Err(Error::BodyReplacement { .. })
    ));
    let not_a_closure = BodySource::closure("1 + 2").unwrap();
    assert!(matches!(
        function.replace_body(not_a_closure),
        Err(Error::BodyReplacement { .. })
    ));
    assert_eq!(function.body_code(None), "return 0;");
}

#[test]
fn abstract_method_has_no_body_to_replace() {
    let class = reflector("<?php abstract class A { abstract protected function run(int $n); }")
        .reflect_class("A")
        .unwrap();
    let mut run = class.method("RUN").unwrap();

    assert!(run.is_abstract());
    assert_eq!(run.visibility(), Some(Visibility::Protected));
    assert!(run.body_statements().is_empty());
    assert_eq!(run.body_code(None), "");
    assert!(matches!(
        run.replace_body(BodySource::code("return 1;")),
        Err(Error::BodyReplacement { .. })
    ));
}

#[test]
fn deeply_nested_body_is_reflected() {
    let code = format!("<?php function deep() {{ return {}1; }}", "1 + ".repeat(20_000));
    let mut function = reflector(&code).reflect_function("deep").unwrap();

    assert!(!function.is_generator());
    assert_eq!(function.body_statements().len(), 1);
    assert!(function.body_code(None).starts_with("return 1 + 1 + "));

    function.replace_body(BodySource::code("return 0;")).unwrap();
    assert_eq!(function.body_code(None), "return 0;");
}

// ── Classes ────────────────────────────────────────────────────────────

#[test]
fn class_members_and_hierarchy() {
    let reflector = reflector(
        "<?php\nnamespace Shop;\n\ninterface Priced extends \\Countable {}\n\nabstract class Base {}\n\n/**\n * An item.\n */\nfinal class Item extends Base implements Priced {\n    const CURRENCY = 'EUR';\n    public function __construct(private int $price, public readonly string $sku) {}\n    public function price(): int { return $this->price; }\n    public function count(): int { return 1; }\n}",
    );

    let item = reflector.reflect_class("Shop\\Item").unwrap();
    assert_eq!(item.name(), "Shop\\Item");
    assert_eq!(item.short_name(), "Item");
    assert_eq!(item.kind(), ClassKind::Class);
    assert!(item.is_final());
    assert!(!item.is_abstract());
    assert_eq!(item.doc_comment(), "/**\n * An item.\n */");
    assert_eq!(item.parent_class_name().as_deref(), Some("Shop\\Base"));
    assert_eq!(item.interface_names(), ["Shop\\Priced"]);
    assert_eq!(item.constants(), [("CURRENCY".to_string(), "'EUR'".to_string())]);
    assert_eq!(item.property_names(), ["price", "sku"]);
    assert_eq!(item.method_names(), ["__construct", "price", "count"]);
    assert!(item.has_method("PRICE"));

    let constructor = item.method("__construct").unwrap();
    assert!(constructor.is_constructor());
    assert!(constructor.parameters().iter().all(|p| p.is_promoted()));
    assert_eq!(constructor.declaring_class_name(), Some("Shop\\Item"));
    assert_eq!(constructor.declaring_class().unwrap().unwrap().name(), "Shop\\Item");

    let parent = item.parent_class().unwrap().unwrap();
    assert!(parent.is_abstract());

    let priced = reflector.reflect_class("Shop\\Priced").unwrap();
    assert!(priced.is_interface());
    assert_eq!(priced.parent_class_name(), None);
    assert_eq!(priced.interface_names(), ["Countable"]);
}

#[test]
fn missing_parent_class_is_not_found() {
    let child = reflector("<?php class Child extends Missing {}").reflect_class("Child").unwrap();
    let err = child.parent_class().err().unwrap();
    assert!(err.is_not_found());
}

#[test]
fn parameter_class_resolves_through_the_reflector() {
    let reflector = reflector("<?php\nclass Dep {}\nclass Service { public function __construct(Dep $dep, self $other) {} }");
    let service = reflector.reflect_class("Service").unwrap();
    let parameters = service.method("__construct").unwrap().parameters();

    assert_eq!(parameters[0].class().unwrap().unwrap().name(), "Dep");
    assert_eq!(parameters[1].class().unwrap().unwrap().name(), "Service");
}

#[test]
fn traits_and_enums() {
    let reflector = reflector(
        "<?php\ntrait Greets { public function hi() {} }\nenum Suit: string { case Hearts = 'H'; case Spades = 'S'; }",
    );
    let greets = reflector.reflect_class("Greets").unwrap();
    assert!(greets.is_trait());
    assert!(greets.has_method("hi"));

    let suit = reflector.reflect_class("Suit").unwrap();
    assert!(suit.is_enum());
    assert_eq!(
        suit.constants(),
        [
            ("Hearts".to_string(), "'H'".to_string()),
            ("Spades".to_string(), "'S'".to_string()),
        ]
    );
}

// ── Locator back-ends ──────────────────────────────────────────────────

#[test]
fn internal_stubs_report_no_user_flags() {
    let reflector = Reflector::new(Box::new(InternalSourceLocator::new()));

    let sprintf = reflector.reflect_function("sprintf").unwrap();
    assert!(sprintf.is_internal());
    assert!(!sprintf.is_user_defined());
    assert!(!sprintf.is_variadic());
    assert!(!sprintf.is_generator());
    assert_eq!(sprintf.file_name(), None);
    assert_eq!(sprintf.number_of_parameters(), 2);

    let iterator = reflector.reflect_class("\\Iterator").unwrap();
    assert!(iterator.is_internal());
    assert!(iterator.is_interface());
    assert_eq!(iterator.interface_names(), ["Traversable"]);
    assert!(iterator.method("current").unwrap().is_abstract());
}

#[test]
fn evaled_fragment_without_tag_parses_with_bare_grammar() {
    let registry = EvaledCodeRegistry::new();
    let reflector = Reflector::new(Box::new(EvaledCodeSourceLocator::new(registry.clone())));
    registry.register("Evaled", "class Evaled { function foo($bar = \"baz\") {} }");

    let class = reflector.reflect_class("Evaled").unwrap();
    assert_eq!(class.name(), "Evaled");
    assert!(class.is_user_defined());
    assert_eq!(class.file_name(), None);
    assert_eq!(class.methods().len(), 1);
    assert_eq!(
        class.methods()[0].parameters()[0].default_value_code().as_deref(),
        Some("\"baz\"")
    );
}

#[test]
fn aggregate_uses_the_first_locator_that_serves() {
    let registry = EvaledCodeRegistry::new();
    registry.register("Shared", "class Shared { function fromRegistry() {} }");
    let reflector = Reflector::new(Box::new(
        AggregateSourceLocator::new()
            .with(EvaledCodeSourceLocator::new(registry))
            .with(StringSourceLocator::new("<?php class Shared { function fromString() {} } function only_here() {}").unwrap()),
    ));

    assert!(reflector.reflect_class("Shared").unwrap().has_method("fromRegistry"));
    assert!(reflector.reflect_function("only_here").is_ok());
}

#[test]
fn reflect_all_returns_every_declaration_of_a_kind() {
    let reflector = reflector("<?php\nnamespace N;\nclass A {}\nfunction f() {}\ninterface B {}\ntrait C {}");
    let classes: Vec<String> = reflector
        .reflect_all(IdentifierKind::Class)
        .unwrap()
        .iter()
        .map(Reflection::name)
        .collect();
    assert_eq!(classes, ["N\\A", "N\\B", "N\\C"]);

    let functions = reflector.reflect_all(IdentifierKind::Function).unwrap();
    assert_eq!(functions.len(), 1);
    assert!(IdentifierKind::Function.matches(&functions[0]));
    assert!(!IdentifierKind::Class.matches(&functions[0]));
}
