//! End-to-end analysis tests: sources in, diagnostics and program state out

use pretty_assertions::assert_eq;
use tern_compiler::driver::Loader;
use tern_compiler::frontend::ast::{MemberKind, StmtKind};
use tern_compiler::frontend::FrontendConfig;
use tern_compiler::sema::{
    Analyzer, AnalyzerConfig, ClassState, CompilationUnit, Diagnostic, ErrorKind, Program, Type,
};
use tern_compiler::{stdlib, DiagnosticReporter};

struct Fixture {
    reporter: DiagnosticReporter,
    units: Vec<CompilationUnit>,
    stdlib: Vec<CompilationUnit>,
}

fn load(files: &[(&str, &str)]) -> Fixture {
    let mut reporter = DiagnosticReporter::new();
    let stdlib = stdlib::load(&mut reporter).unwrap();
    let mut loader = Loader::new(&mut reporter, FrontendConfig::default());
    let units = files
        .iter()
        .map(|(name, source)| loader.load_source(name.to_string(), source.to_string()).unwrap())
        .collect();
    Fixture { reporter, units, stdlib }
}

fn library() -> Analyzer {
    Analyzer::new(AnalyzerConfig::default())
}

fn check(files: &[(&str, &str)]) -> Result<Program, Vec<Diagnostic>> {
    let fixture = load(files);
    library().analyze(fixture.units, fixture.stdlib)
}

fn kinds(files: &[(&str, &str)]) -> Vec<ErrorKind> {
    match check(files) {
        Ok(_) => Vec::new(),
        Err(diagnostics) => diagnostics.iter().map(|d| d.kind).collect(),
    }
}

fn body(source: &str) -> Vec<ErrorKind> {
    kinds(&[("main.tn", source)])
}

// ==================== Whole programs ====================

const SHAPES: &str = r#"
package app.model;

public interface Shape {
    area(): Float;
    name(): Text;
}

public class Square implements Shape {
    public var side: Float = 1.0;

    area(): Float { return side * side; }
    name(): Text { return "square"; }
}
"#;

const MAIN: &str = r#"
package app;

import app.model.*;
import std.io.Console;

class Main {
    entry(args: [Text]): Void {
        val shapes: [Shape] = [new Square()];
        var total: Float = 0.0;
        for shape in shapes {
            total = total + shape.area();
        }

        val console = new Console();
        console.println("total computed");
        if total > 10.0 && args.length > 0 {
            console.println(args[0]);
        }
        val biggest: Int = new Math().max(1, 2);
    }
}
"#;

#[test]
fn test_well_formed_program_reaches_checked() {
    let fixture = load(&[("model.tn", SHAPES), ("main.tn", MAIN)]);
    let analyzer = Analyzer::new(AnalyzerConfig { require_entry_point: true });
    let program = analyzer.analyze(fixture.units, fixture.stdlib).unwrap();

    for name in ["app.Main", "app.model.Shape", "app.model.Square"] {
        assert_eq!(program.class_state(name), Some(ClassState::Checked), "{}", name);
    }
    // Library classes are linked but their native bodies are never checked
    assert_eq!(program.class_state("std.io.Console"), Some(ClassState::Linked));
    assert_eq!(program.entry_point(), program.find_class("Main"));
    assert!(program.warnings.is_empty());
}

#[test]
fn test_expressions_are_annotated() {
    let source = "class T { run(): Void { val x = 1 + 2; val flag = x > 2; } }";
    let program = check(&[("t.tn", source)]).unwrap();

    let decl = &program.user_units()[0].tree.decls[0];
    let MemberKind::Method(method) = &decl.members[0].kind else {
        panic!("expected method");
    };
    let stmts = &method.body.as_ref().unwrap().stmts;
    let types: Vec<_> = stmts
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Var { init: Some(init), .. } => init.ty.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(types, vec![Some(Type::INT), Some(Type::BOOL)]);
}

#[test]
fn test_every_error_is_reported() {
    let source = "
        class A {
            f(): Void { val x: Int = true; }
            g(): Void { val y: Bool = 1; }
        }
        class B { h(): Void { undefinedThing(); } }
    ";
    assert_eq!(
        body(source),
        vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch, ErrorKind::UndeclaredSymbol]
    );
}

#[test]
fn test_poisoned_values_do_not_cascade() {
    let source = "class T { run(): Void { val x: Missing = foo(); val y: Int = x + 1; } }";
    assert_eq!(body(source), vec![ErrorKind::UndeclaredType, ErrorKind::UndeclaredSymbol]);
}

// ==================== Declarations ====================

#[test]
fn test_duplicate_class_in_one_file() {
    let diagnostics = check(&[("a.tn", "class A {} class A {}")]).err().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateClass);
}

#[test]
fn test_duplicate_class_regardless_of_file_order() {
    let first = ("first.tn", "package p; class A {}");
    let second = ("second.tn", "package q;\nclass A { x(): Int { return 1; } }");

    for (files, reported_in) in [([first, second], "second.tn:2:1"), ([second, first], "first.tn:1:12")] {
        let fixture = load(&files);
        let sources = fixture.reporter.sources();
        let diagnostics = library().analyze(fixture.units.clone(), fixture.stdlib.clone()).err().unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateClass);
        assert!(diagnostics[0].render_plain(sources).starts_with(reported_in));
    }
}

#[test]
fn test_user_class_cannot_shadow_stdlib() {
    let diagnostics = check(&[("console.tn", "package app; class Console {}")]).err().unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateClass);
    let notes: Vec<_> = diagnostics[0].notes.iter().map(|(note, _)| note.as_str()).collect();
    assert_eq!(
        notes[1],
        "the name `Console` is reserved by the standard library class `std.io.Console`"
    );
}

#[test]
fn test_user_duplicates_get_no_stdlib_note() {
    let diagnostics = check(&[("a.tn", "class A {} class A {}")]).err().unwrap();
    assert_eq!(diagnostics[0].notes.len(), 1);
}

#[test]
fn test_duplicate_local_in_same_block() {
    let source = "class T { run(): void { var x: Int = 1; var x: Int = 2; } }";
    let fixture = load(&[("t.tn", source)]);
    let sources = fixture.reporter.sources();
    let diagnostics = library().analyze(fixture.units.clone(), fixture.stdlib.clone()).err().unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateSymbolInScope);
    let column = source.find("var x: Int = 2").unwrap() + 1;
    assert!(diagnostics[0].render_plain(sources).starts_with(&format!("t.tn:1:{}:", column)));
}

#[test]
fn test_disjoint_scopes() {
    let source = "class T { run(): void { if true { var x: Int = 1; } var x: Int = 2; } }";
    assert_eq!(body(source), vec![]);
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let source = r#"
        class T {
            run(): Void {
                var x: Int = 1;
                if true {
                    var x: Text = "inner";
                    val t: Text = x;
                }
                val n: Int = x;
            }
        }
    "#;
    assert_eq!(body(source), vec![]);
}

#[test]
fn test_duplicate_parameters() {
    assert_eq!(
        body("class T { f(a: Int, a: Int): Void { } }"),
        vec![ErrorKind::DuplicateSymbolInScope]
    );
}

// ==================== Mutability and accessors ====================

#[test]
fn test_assignment_to_val_ignores_value_type() {
    let source = r#"class T { run(n: Int): Void { val x: Int = 1; x = 2; x = "text"; n = 3; } }"#;
    assert_eq!(
        body(source),
        vec![
            ErrorKind::ImmutableAssignment,
            ErrorKind::ImmutableAssignment,
            ErrorKind::ImmutableAssignment,
        ]
    );
}

const COUNTER: &str = r#"
package app;

class Counter {
    public var count: Int = 0;
    public val limit: Int = 10;
    private var secret: Int = 0;

    bump(): Void { secret = secret + 1; }
}
"#;

#[test]
fn test_accessor_calls() {
    let user = r#"
        package app;

        class User {
            use(c: Counter): Void {
                val current: Int = c.count();
                c.count(current + 1);
                val max: Int = c.limit();
            }
        }
    "#;
    assert_eq!(kinds(&[("counter.tn", COUNTER), ("user.tn", user)]), vec![]);
}

#[test]
fn test_accessor_violations() {
    let user = r#"
        package app;

        class User {
            bad(c: Counter): Void {
                c.limit(5);
                c.count("five");
                c.count(1, 2);
                c.secret();
            }
        }
    "#;
    assert_eq!(
        kinds(&[("counter.tn", COUNTER), ("user.tn", user)]),
        vec![
            ErrorKind::ImmutableAssignment,
            ErrorKind::TypeMismatch,
            ErrorKind::ArityMismatch,
            ErrorKind::VisibilityViolation,
        ]
    );
}

#[test]
fn test_private_members_of_superclass() {
    let source = "
        class Base { private var hidden: Int = 1; private helper(): Int { return 2; } }
        class Child extends Base { peek(): Int { return hidden + helper(); } }
    ";
    assert_eq!(
        body(source),
        vec![ErrorKind::VisibilityViolation, ErrorKind::VisibilityViolation]
    );
}

// ==================== Inheritance ====================

#[test]
fn test_inheritance_cycle_poisons_members_only() {
    let source = r#"
        class A extends B { run(): Void { val x: Int = "not checked"; } }
        class B extends A { }
        class C { run(): Int { return 1; } }
        class D extends A { run(): Void { } }
    "#;
    let fixture = load(&[("cycle.tn", source)]);
    let (program, diagnostics) = library().run(fixture.units, fixture.stdlib);
    let diagnostics = diagnostics.into_vec();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::InheritanceCycle);
    assert_eq!(diagnostics[0].message, "inheritance cycle: A -> B -> A");
    assert_eq!(program.class_state("A"), Some(ClassState::Poisoned));
    assert_eq!(program.class_state("B"), Some(ClassState::Poisoned));
    assert_eq!(program.class_state("C"), Some(ClassState::Checked));
    assert_eq!(program.class_state("D"), Some(ClassState::Checked));
}

#[test]
fn test_self_inheritance() {
    let diagnostics = check(&[("s.tn", "class S extends S {}")]).err().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "inheritance cycle: S -> S");
}

#[test]
fn test_cycle_message_names_real_edges() {
    let source = "
        interface I1 extends I2 {}
        interface I2 extends I3, I1 {}
        interface I3 extends I2 {}
    ";
    let diagnostics = check(&[("i.tn", source)]).err().unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::InheritanceCycle);
    assert_eq!(diagnostics[0].message, "inheritance cycle: I1 -> I2 -> I1");
}

#[test]
fn test_three_class_cycle_message() {
    let source = "
        class A extends B {}
        class B extends C {}
        class C extends A {}
    ";
    let diagnostics = check(&[("abc.tn", source)]).err().unwrap();
    assert_eq!(diagnostics[0].message, "inheritance cycle: A -> B -> C -> A");
}

#[test]
fn test_unresolved_supertype_poisons_class() {
    let fixture = load(&[("a.tn", "class A extends Missing { run(): Void { val x: Int = true; } }")]);
    let (program, diagnostics) = library().run(fixture.units, fixture.stdlib);

    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::UndeclaredType]);
    assert_eq!(program.class_state("A"), Some(ClassState::Poisoned));
}

#[test]
fn test_subclass_is_assignable_to_superclass() {
    let source = "
        class Animal { }
        class Dog extends Animal { }
        class Zoo {
            run(): Void {
                var a: Animal = new Dog();
                var pack: [Animal] = [new Dog(), new Animal()];
                var d: Dog = new Animal();
            }
        }
    ";
    assert_eq!(body(source), vec![ErrorKind::TypeMismatch]);
}

#[test]
fn test_invalid_supertypes() {
    let source = "
        interface I {}
        class X {}
        class Y {}
        class A extends I {}
        class B implements X {}
        class C extends X, Y {}
        interface J extends X {}
    ";
    assert_eq!(body(source), vec![ErrorKind::InvalidSupertype; 4]);
}

#[test]
fn test_interface_conformance() {
    let source = r#"
        interface Named { name(): Text; }
        class Base { name(): Text { return "base"; } }
        class Derived extends Base implements Named { }
        class Broken implements Named { }
    "#;
    assert_eq!(body(source), vec![ErrorKind::MissingInterfaceMethod]);
}

#[test]
fn test_interface_conformance_is_transitive() {
    let source = "
        interface A { a(): Int; }
        interface B extends A { b(): Int; }
        class C implements B { b(): Int { return 1; } }
    ";
    let diagnostics = check(&[("c.tn", source)]).err().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::MissingInterfaceMethod);
    assert!(diagnostics[0].message.contains("A.a"));
}

#[test]
fn test_interfaces_cannot_be_instantiated() {
    assert_eq!(
        body("interface I {} class T { run(): Void { val i = new I(); } }"),
        vec![ErrorKind::TypeMismatch]
    );
}

// ==================== Imports ====================

#[test]
fn test_import_rules() {
    let no_import = "package app; class Main { run(): Void { val c = new Console(); } }";
    assert_eq!(body(no_import), vec![ErrorKind::UnresolvedImport]);

    let explicit = "package app; import std.io.Console; class Main { run(): Void { new Console().println(\"hi\"); } }";
    assert_eq!(body(explicit), vec![]);

    let wildcard = "package app; import std.*; class Main { run(): Void { new Console().println(\"hi\"); } }";
    assert_eq!(body(wildcard), vec![]);

    let qualified = "package app; class Main { run(): Void { val c: std.io.Console = new std.io.Console(); } }";
    assert_eq!(body(qualified), vec![]);

    let prelude = "package app; class Main { run(): Int { return new Math().abs(-3); } }";
    assert_eq!(body(prelude), vec![]);
}

#[test]
fn test_unresolved_imports_are_batched() {
    let source = "package app; import std.io.Missing; import nothing.here.*; class A {}";
    assert_eq!(body(source), vec![ErrorKind::UnresolvedImport, ErrorKind::UnresolvedImport]);
}

#[test]
fn test_imports_stay_file_local() {
    let a = "package app; import std.io.Console; class A { run(): Void { val c = new Console(); } }";
    let b = "package app; class B { run(): Void { val c = new Console(); } }";
    let diagnostics = check(&[("a.tn", a), ("b.tn", b)]).err().unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::UnresolvedImport);
}

#[test]
fn test_duplicate_import_is_a_warning() {
    let source = "package app; import std.io.Console; import std.io.Console; class A {}";
    let program = check(&[("a.tn", source)]).unwrap();
    assert_eq!(program.warnings.len(), 1);
}

#[test]
fn test_wildcard_overlapping_explicit_import_is_not_a_duplicate() {
    let orders = [
        "package app; import std.io.*; import std.io.Console; class A { run(): Void { new Console().println(\"a\"); } }",
        "package app; import std.io.Console; import std.io.*; class A { run(): Void { new Console().println(\"a\"); } }",
    ];
    for source in orders {
        let program = check(&[("a.tn", source)]).unwrap();
        assert!(program.warnings.is_empty(), "{}", source);
    }
}

#[test]
fn test_private_class_of_other_package() {
    let lib = "package lib; private class Hidden {} class Shown { peek(): Hidden { return new Hidden(); } }";
    let app = "package app; import lib.Hidden; class A {}";
    assert_eq!(kinds(&[("lib.tn", lib), ("app.tn", app)]), vec![ErrorKind::VisibilityViolation]);
}

// ==================== Statements and expressions ====================

#[test]
fn test_conditions_and_loops() {
    let source = r#"
        class T {
            run(xs: [Text]): Void {
                if 1 { }
                while "x" { }
                for i in 5 { }
                for s in xs { s = "a"; }
            }
        }
    "#;
    assert_eq!(
        body(source),
        vec![
            ErrorKind::TypeMismatch,
            ErrorKind::TypeMismatch,
            ErrorKind::TypeMismatch,
            ErrorKind::ImmutableAssignment,
        ]
    );
}

#[test]
fn test_return_types() {
    let source = r#"
        class T {
            f(): Int { return "a"; }
            g(): Int { return; }
            h(): Void { return 1; }
            k(): Int { return 1; }
        }
    "#;
    assert_eq!(body(source), vec![ErrorKind::TypeMismatch; 3]);
}

#[test]
fn test_no_implicit_widening() {
    let source = "class T { run(): Void { var f: Float = 1; val g: Float = 1.0 + 2; } }";
    assert_eq!(body(source), vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]);
}

#[test]
fn test_null_only_for_references() {
    let source = "class A { run(): Void { var a: A = null; val same: Bool = a == null; var i: Int = null; } }";
    assert_eq!(body(source), vec![ErrorKind::TypeMismatch]);
}

#[test]
fn test_callable_values() {
    let source = "
        class Calc {
            public var op: (Int) -> Int;

            double(x: Int): Int { return x * 2; }
            apply(f: (Int) -> Int, x: Int): Int { return f(x); }

            run(): Int {
                val g: (Int) -> Int = double;
                op = double;
                return apply(g, 3) + op(4) + this.double(5);
            }
        }
    ";
    assert_eq!(body(source), vec![]);
}

#[test]
fn test_call_arity_and_argument_types() {
    let source = r#"
        class Calc {
            double(x: Int): Int { return x * 2; }
            run(): Void {
                double(1, 2);
                double("two");
                val n: Int = 3;
                n();
            }
        }
    "#;
    assert_eq!(
        body(source),
        vec![ErrorKind::ArityMismatch, ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]
    );
}

#[test]
fn test_arrays() {
    let source = r#"
        class T {
            run(): Void {
                val empty: [Int] = [];
                val xs = [1, 2, 3];
                val n: Int = xs[0] + xs.length;
                val bad = [];
                val mixed = [1, "two"];
                val wrong = xs["0"];
            }
        }
    "#;
    assert_eq!(
        body(source),
        vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]
    );
}

#[test]
fn test_unknown_members() {
    let source = "class T { run(): Void { val n = this.missing; val m = true.foo; missing(); } }";
    assert_eq!(body(source), vec![ErrorKind::UndeclaredSymbol; 3]);
}

#[test]
fn test_programs_are_independent() {
    let first = check(&[("a.tn", "class A {}")]).unwrap();
    let second = check(&[("a.tn", "class A {}")]).unwrap();
    assert_eq!(first.user_units().len(), second.user_units().len());
    assert_eq!(first.find_class("A"), second.find_class("A"));
}
