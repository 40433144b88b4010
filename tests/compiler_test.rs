use lumen::bytecode::{Chunk, OpCode};
use lumen::compiler::Compiler;
use lumen::debug::{disassemble_chunk, disassemble_instruction};
use lumen::error::{Diagnostics, ErrorCategory};
use lumen::interner::Interner;
use lumen::object::{Function, Obj};
use lumen::parser::Parser;
use lumen::compile_source;
use lumen::value::Value;
use std::rc::Rc;

fn compile(source: &str) -> Rc<Function> {
    let mut interner = Interner::new();
    match compile_source("<test>", source, &mut interner) {
        Ok(function) => function,
        Err(diagnostics) => panic!("compilation failed: {}", diagnostics),
    }
}

fn compile_errors(source: &str) -> Diagnostics {
    let mut interner = Interner::new();
    compile_source("<test>", source, &mut interner).expect_err("expected compilation to fail")
}

fn ops(chunk: &Chunk) -> Vec<OpCode> {
    let mut ops = Vec::new();
    let mut offset = 0;
    while offset < chunk.len() {
        ops.push(OpCode::try_from(chunk.code[offset]).expect("unknown opcode"));
        offset = disassemble_instruction(chunk, offset).1;
    }
    ops
}

fn function_constant(chunk: &Chunk, name: &str) -> Rc<Function> {
    chunk
        .constants
        .iter()
        .find_map(|constant| match constant {
            Value::Obj(Obj::Function(function)) if function.display_name() == name => {
                Some(Rc::clone(function))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function constant named {}", name))
}

/// True if some listing line ends with the given whitespace-separated words.
fn has_instruction(listing: &str, words: &[&str]) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().collect::<Vec<_>>().ends_with(words))
}

#[test]
fn expression_statement_pops_its_value() {
    let script = compile("1 + 2;");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpConstant,
            OpCode::OpConstant,
            OpCode::OpAdd,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
    assert_eq!(script.chunk.constants[..2], [Value::Int(1), Value::Int(2)]);
    assert_eq!(script.display_name(), "script");
}

#[test]
fn literals_use_dedicated_opcodes() {
    let script = compile("true; false; null; -1; !true; +2;");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpTrue,
            OpCode::OpPop,
            OpCode::OpFalse,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpPop,
            OpCode::OpConstant,
            OpCode::OpNegate,
            OpCode::OpPop,
            OpCode::OpTrue,
            OpCode::OpNot,
            OpCode::OpPop,
            OpCode::OpConstant,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
}

#[test]
fn globals_are_defined_and_set_by_name() {
    let script = compile("var a = 1; a = 2;");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpConstant,
            OpCode::OpDefineGlobal,
            OpCode::OpConstant,
            OpCode::OpSetGlobal,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
}

#[test]
fn block_locals_live_in_stack_slots() {
    let script = compile("{ var a = 1; print a; }");
    let op = |code: OpCode| u8::from(code);
    assert_eq!(
        script.chunk.code,
        vec![
            op(OpCode::OpConstant),
            0,
            op(OpCode::OpGetGlobal),
            1,
            op(OpCode::OpGetLocal),
            1,
            op(OpCode::OpCall),
            1,
            op(OpCode::OpPop),
            op(OpCode::OpPop),
            op(OpCode::OpNull),
            op(OpCode::OpReturn),
        ]
    );
}

#[test]
fn print_is_a_call_of_the_global_builtin() {
    let script = compile("print 1, 2;");
    let listing = disassemble_chunk(&script.chunk, "script");
    assert!(listing.contains("OpGetGlobal"));
    assert!(listing.contains("'print'"));
    assert!(has_instruction(&listing, &["OpCall", "2"]), "{}", listing);
}

#[test]
fn function_declaration_emits_closure_and_global() {
    let script = compile("fun add(a, b) { return a + b; }");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpClosure,
            OpCode::OpDefineGlobal,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
    let add = function_constant(&script.chunk, "add");
    assert_eq!(add.arity, 2);
    assert_eq!(add.upvalue_count, 0);
    assert_eq!(
        ops(&add.chunk),
        vec![
            OpCode::OpGetLocal,
            OpCode::OpGetLocal,
            OpCode::OpAdd,
            OpCode::OpReturn,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
    assert_eq!(Value::Obj(Obj::Function(add)).to_string(), "<fn add>");
}

#[test]
fn captured_local_becomes_an_upvalue() {
    let script = compile("fun outer() { var x = 1; fun inner() { return x; } return inner; }");
    let outer = function_constant(&script.chunk, "outer");
    let inner = function_constant(&outer.chunk, "inner");

    assert_eq!(inner.upvalue_count, 1);
    assert_eq!(
        ops(&inner.chunk),
        vec![
            OpCode::OpGetUpvalue,
            OpCode::OpReturn,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );

    // OpClosure <constant> followed by (is_local = 1, slot = 1) for x.
    let closure_at = outer
        .chunk
        .code
        .iter()
        .position(|byte| *byte == u8::from(OpCode::OpClosure))
        .unwrap();
    assert_eq!(outer.chunk.code[closure_at + 2..closure_at + 4], [1, 1]);
}

#[test]
fn upvalues_thread_through_intermediate_functions() {
    let script = compile(
        "fun a() { var x = 1; fun b() { fun c() { return x; } return c; } return b; }",
    );
    let a = function_constant(&script.chunk, "a");
    let b = function_constant(&a.chunk, "b");
    let c = function_constant(&b.chunk, "c");
    assert_eq!(b.upvalue_count, 1);
    assert_eq!(c.upvalue_count, 1);

    let listing = disassemble_chunk(&b.chunk, "b");
    assert!(listing.contains("upvalue 0"), "{}", listing);
    let listing = disassemble_chunk(&a.chunk, "a");
    assert!(listing.contains("local 1"), "{}", listing);
}

#[test]
fn leaving_a_block_closes_captured_locals() {
    let script = compile("{ var x = 1; fun f() { return x; } }");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpConstant,
            OpCode::OpClosure,
            OpCode::OpPop,
            OpCode::OpCloseUpvalue,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
}

#[test]
fn if_else_jumps_are_patched() {
    let script = compile("if (true) print 1; else print 2;");
    let listing = disassemble_chunk(&script.chunk, "script");
    let jumps: Vec<&str> = listing
        .lines()
        .filter(|line| line.contains("OpJump"))
        .collect();
    assert_eq!(jumps.len(), 2, "{}", listing);
    assert!(jumps[0].contains("OpJumpIfFalse") && jumps[0].ends_with("-> 15"));
    assert!(jumps[1].ends_with("-> 23"));
}

#[test]
fn while_loop_jumps_back_to_its_condition() {
    let script = compile("var i = 0; while (i < 3) i = i + 1;");
    let listing = disassemble_chunk(&script.chunk, "script");
    let target = |name: &str| {
        listing
            .lines()
            .find(|line| line.contains(name))
            .and_then(|line| line.rsplit("-> ").next())
            .map(str::to_string)
    };
    assert_eq!(target("OpLoop").as_deref(), Some("4"));
    assert_eq!(target("OpJumpIfFalse").as_deref(), Some("24"));
}

#[test]
fn for_loop_scopes_its_variable() {
    let script = compile("for (var i = 0; i < 2; i = i + 1) print i;");
    let ops = ops(&script.chunk);
    assert!(!ops.contains(&OpCode::OpDefineGlobal));
    assert!(ops.contains(&OpCode::OpGetLocal));
    assert_eq!(ops.iter().filter(|op| **op == OpCode::OpLoop).count(), 2);
}

#[test]
fn logical_operators_short_circuit() {
    let script = compile("true && false; true || false;");
    assert_eq!(
        ops(&script.chunk),
        vec![
            OpCode::OpTrue,
            OpCode::OpJumpIfFalse,
            OpCode::OpPop,
            OpCode::OpFalse,
            OpCode::OpPop,
            OpCode::OpTrue,
            OpCode::OpJumpIfFalse,
            OpCode::OpJump,
            OpCode::OpPop,
            OpCode::OpFalse,
            OpCode::OpPop,
            OpCode::OpNull,
            OpCode::OpReturn,
        ]
    );
}

#[test]
fn line_table_follows_statements() {
    let script = compile("var a = 1;\nvar b = 2;");
    let define_b = script
        .chunk
        .code
        .iter()
        .rposition(|byte| *byte == u8::from(OpCode::OpDefineGlobal))
        .unwrap();
    assert_eq!(script.chunk.line_at(0), 1);
    assert_eq!(script.chunk.line_at(define_b), 2);
}

#[test]
fn top_level_return_is_a_compile_error() {
    let diagnostics = compile_errors("return 1;");
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::Compile);
    assert_eq!(diagnostic.message, "Can't return from top-level code.");
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    let mut parser = Parser::from_source("<test>", "{ var a = a; }");
    let program = parser.parse();
    let mut interner = Interner::new();
    let diagnostics = Compiler::new(&mut interner, None)
        .compile(&program)
        .expect_err("expected compilation to fail");
    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Can't read local variable in its own initializer."]);
}

#[test]
fn initializer_may_read_a_shadowed_binding() {
    let script = compile("{ var a = 1; { var a = a; } }");
    let listing = disassemble_chunk(&script.chunk, "script");
    assert!(has_instruction(&listing, &["OpGetLocal", "1"]), "{}", listing);
}

#[test]
fn too_many_constants() {
    let source: String = (0..300).map(|i| format!("{};", i)).collect();
    let diagnostics = compile_errors(&source);
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Too many constants in one chunk."));
}

#[test]
fn too_many_locals() {
    let declarations: String = (0..300).map(|i| format!("var v{};", i)).collect();
    let diagnostics = compile_errors(&format!("{{ {} }}", declarations));
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Too many local variables in function."));
}

#[test]
fn too_much_code_to_jump_over() {
    let body = "true;".repeat(33_000);
    let diagnostics = compile_errors(&format!("if (true) {{ {} }}", body));
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Too much code to jump over."));
}

#[test]
fn loop_body_too_large() {
    let body = "true;".repeat(33_000);
    let diagnostics = compile_errors(&format!("while (true) {{ {} }}", body));
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Loop body too large."));
}

#[test]
fn too_many_upvalues() {
    let declare = |prefix: &str| -> String {
        (0..200).map(|i| format!("var {}{};", prefix, i)).collect()
    };
    let reads: String = (0..200)
        .map(|i| format!("a{}; b{};", i, i))
        .collect();
    let source = format!(
        "fun a() {{ {} fun b() {{ {} fun c() {{ {} }} }} }}",
        declare("a"),
        declare("b"),
        reads
    );
    let diagnostics = compile_errors(&source);
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Too many closure variables in function."));
}
