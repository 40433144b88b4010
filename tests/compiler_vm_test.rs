use lumen::compiler::Compiler;
use lumen::error::{Error, RuntimeError, RuntimeFailure};
use lumen::interner::Interner;
use lumen::parser::Parser;
use lumen::vm::{FRAMES_MAX, VM};
use lumen::{compile_source, run_source};

fn run_code(source: &str) -> (Result<(), RuntimeFailure>, String) {
    let mut interner = Interner::new();
    let script = match compile_source("<test>", source, &mut interner) {
        Ok(script) => script,
        Err(diagnostics) => panic!("compilation failed: {}", diagnostics),
    };
    let mut vm = VM::new(&mut interner, Vec::new());
    let result = vm.interpret(script);
    let output = String::from_utf8(vm.into_output()).expect("output is not UTF-8");
    (result, output)
}

fn output_of(source: &str) -> String {
    let (result, output) = run_code(source);
    if let Err(failure) = result {
        panic!("runtime error: {} {:?}", failure, failure.trace);
    }
    output
}

fn runtime_error(source: &str) -> RuntimeFailure {
    run_code(source).0.expect_err("expected a runtime error")
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(
        output_of("print 1 + 2 * 3, (1 + 2) * 3, 7 / 2, -7 / 2, +4 - 10;"),
        "7 9 3 -3 -6\n"
    );
}

#[test]
fn test_print_formats_values() {
    let source = "fun f() {}
print \"hello\", true, false, null;
print f, print;
print;";
    assert_eq!(
        output_of(source),
        "hello true false null\n<fn f> <native fn>\n\n"
    );
}

#[test]
fn test_equality_and_truthiness() {
    let source = "fun f() {} fun g() {} var a = f;
print 1 == 1, true != false, null == null, \"x\" == \"x\", \"x\" == \"y\";
print a == f, f == g;
print !null, !0, !\"\";";
    assert_eq!(
        output_of(source),
        "true true true true false\ntrue false\ntrue false false\n"
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        output_of("print 1 < 2, 2 <= 2, 3 > 4, 4 >= 5, 1 != 2;"),
        "true true false false true\n"
    );
}

#[test]
fn test_if_else() {
    assert_eq!(output_of("if (1 > 2) print 1; else print 2;"), "2\n");
    assert_eq!(output_of("if (true) print \"then\";"), "then\n");
    assert_eq!(
        output_of("var n = 5; if (n < 3) print \"small\"; else if (n < 10) print \"medium\"; else print \"large\";"),
        "medium\n"
    );
}

#[test]
fn test_while_loop() {
    let source = "var i = 0; var sum = 0;
while (i < 5) { sum = sum + i; i = i + 1; }
print sum;";
    assert_eq!(output_of(source), "10\n");
}

#[test]
fn test_for_loop() {
    assert_eq!(
        output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
    let source = "var total = 0; var i;
for (i = 10; i > 0; i = i - 3) total = total + i;
print total, i;";
    assert_eq!(output_of(source), "22 -2\n");
}

#[test]
fn test_logical_operators_short_circuit() {
    let source = "fun side() { print \"side\"; return true; }
print false && side();
print true || side();
print true && side();";
    assert_eq!(output_of(source), "false\ntrue\nside\ntrue\n");
}

#[test]
fn test_scope_shadowing() {
    let source = "var x = 1;
{ var x = 2; print x; { var x = 3; print x; } print x; }
print x;";
    assert_eq!(output_of(source), "2\n3\n2\n1\n");
}

#[test]
fn test_local_initializer_reads_outer_binding() {
    assert_eq!(output_of("{ var a = 1; { var a = a + 1; print a; } }"), "2\n");
}

#[test]
fn test_function_definition_and_call() {
    assert_eq!(
        output_of("fun add(int a, int b) -> int { return a + b; } print add(2, 5);"),
        "7\n"
    );
}

#[test]
fn test_function_without_return_yields_null() {
    assert_eq!(output_of("fun nothing() {} print nothing();"), "null\n");
}

#[test]
fn test_recursive_function_call_frames() {
    let source = "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
print fib(15);";
    assert_eq!(output_of(source), "610\n");
}

#[test]
fn test_forward_reference_between_functions() {
    let source = "print isEven(10);
fun isEven(n) { if (n == 0) return true; return isOdd(n - 1); }
fun isOdd(n) { if (n == 0) return false; return isEven(n - 1); }";
    assert_eq!(output_of(source), "true\n");
}

#[test]
fn test_closure_counter() {
    let source = "fun makeCounter() {
  var count = 0;
  fun counter() { count = count + 1; return count; }
  return counter;
}
var c = makeCounter();
print c(); print c(); print c();";
    assert_eq!(output_of(source), "1\n2\n3\n");
}

#[test]
fn test_counters_are_independent() {
    let source = "fun makeCounter() {
  var count = 0;
  fun counter() { count = count + 1; return count; }
  return counter;
}
var a = makeCounter();
var b = makeCounter();
a(); a();
print a(), b();";
    assert_eq!(output_of(source), "3 1\n");
}

#[test]
fn test_closure_outlives_its_frame() {
    let source = "fun f() { var x = 1; fun g() { return x; } return g; }
print f()();";
    assert_eq!(output_of(source), "1\n");
}

#[test]
fn test_closures_share_a_captured_variable() {
    let source = "var get; var set;
fun make() {
  var v = 0;
  fun g() { return v; }
  fun s(n) { v = n; }
  get = g;
  set = s;
}
make();
set(5);
print get();";
    assert_eq!(output_of(source), "5\n");
}

#[test]
fn test_block_closes_captured_local() {
    let source = "var show;
{ var msg = \"inner\"; fun f() { print msg; } show = f; }
show();";
    assert_eq!(output_of(source), "inner\n");
}

#[test]
fn test_nested_closures_capture_through_levels() {
    let source = "fun outer() {
  var x = \"deep\";
  fun middle() { fun inner() { return x; } return inner; }
  return middle;
}
print outer()()();";
    assert_eq!(output_of(source), "deep\n");
}

#[test]
fn test_undefined_symbol_is_rejected_before_running() {
    let result = run_source("<test>", "x = 1;", Vec::new());
    let Err(Error::Diagnostics(diagnostics)) = result else {
        panic!("expected diagnostics");
    };
    let messages: Vec<String> = diagnostics.iter().map(|d| d.message.clone()).collect();
    assert_eq!(messages, vec!["Undefined symbol 'x'."]);
}

#[test]
fn test_run_source_returns_output() {
    let output = run_source("<test>", "print 40 + 2;", Vec::new()).unwrap();
    assert_eq!(output, b"42\n");
}

#[test]
fn test_undefined_global_at_runtime() {
    let failure = runtime_error("fun f() { return later; } print f(); var later = 1;");
    assert_eq!(failure.error, RuntimeError::UndefinedGlobal("later".to_string()));
    assert_eq!(failure.to_string(), "RuntimeError: Undefined variable 'later'.");
}

#[test]
fn test_arity_mismatch_at_runtime() {
    let failure = runtime_error("fun f(a) { return a; } var g = f; g(1, 2);");
    assert_eq!(
        failure.error,
        RuntimeError::ArityMismatch {
            expected: 1,
            got: 2
        }
    );
}

#[test]
fn test_division_by_zero() {
    let (result, output) = run_code("print 1; print 1 / 0; print 2;");
    let failure = result.unwrap_err();
    assert_eq!(failure.error, RuntimeError::DivisionByZero);
    assert_eq!(failure.trace, vec!["[line 1] in script"]);
    assert_eq!(output, "1\n");
}

#[test]
fn test_integer_overflow() {
    let failure = runtime_error("print 9223372036854775807 + 1;");
    assert_eq!(failure.error, RuntimeError::IntegerOverflow);
}

#[test]
fn test_type_mismatch_runtime_error() {
    let failure = runtime_error("fun add(a, b) { return a + b; } print add(\"x\", 1);");
    assert!(matches!(failure.error, RuntimeError::TypeMismatch(_)));
}

#[test]
fn test_calling_a_non_function() {
    let failure = runtime_error("var n = null; n();");
    assert_eq!(failure.error, RuntimeError::NotCallable("null".to_string()));
}

#[test]
fn test_stack_overflow() {
    let failure = runtime_error("fun r(n) { return r(n + 1); } r(0);");
    assert_eq!(failure.error, RuntimeError::StackOverflow);
    assert_eq!(failure.trace.len(), FRAMES_MAX);
    assert_eq!(failure.trace[0], "[line 1] in r()");
    assert_eq!(failure.trace[FRAMES_MAX - 1], "[line 1] in script");
}

#[test]
fn test_stack_trace_lists_frames_innermost_first() {
    let source = "fun inner() { return 1 / 0; }
fun outer() {
  return inner();
}
outer();";
    let failure = runtime_error(source);
    assert_eq!(
        failure.trace,
        vec!["[line 1] in inner()", "[line 3] in outer()", "[line 5] in script"]
    );
}

#[test]
fn test_vm_resets_after_error_and_keeps_globals() {
    let mut interner = Interner::new();
    let first = compile_source("<first>", "var a = 41; print 1 / 0;", &mut interner).unwrap();
    let mut vm = VM::new(&mut interner, Vec::new());
    assert!(vm.interpret(first).is_err());
    assert_eq!(vm.stack_depth(), 0);

    // Compiled without analysis: `a` is only known to the VM's globals.
    let mut parser = Parser::from_source("<second>", "print a + 1;");
    let program = parser.parse();
    let second = Compiler::new(&mut interner, None).compile(&program).unwrap();
    vm.interpret(second).unwrap();
    assert_eq!(vm.output(), b"42\n");
}
