use lumen::ast::{BinaryOp, ExprKind, Literal, LogicalOp, RelationalOp, Stmt, StmtKind, UnaryOp};
use lumen::error::{Diagnostics, ErrorCategory};
use lumen::lexer::Lexer;
use lumen::parser::Parser;
use std::env;
use std::fs;
use std::path::PathBuf;

fn parse(source: &str) -> (Stmt, Diagnostics) {
    let mut parser = Parser::from_source("<test>", source);
    let program = parser.parse();
    (program, parser.into_diagnostics())
}

fn parse_ok(source: &str) -> Vec<Stmt> {
    let (program, diagnostics) = parse(source);
    assert!(!diagnostics.had_errors(), "unexpected errors: {}", diagnostics);
    program.statements().to_vec()
}

fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|d| d.message.clone()).collect()
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("lumen_parser_{}_{}", std::process::id(), name));
    path
}

#[test]
fn program_root_is_a_sequence() {
    let (program, diagnostics) = parse("var a = 1; a;");
    assert!(!diagnostics.had_errors());
    assert!(matches!(program.kind, StmtKind::Sequence(ref statements) if statements.len() == 2));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let statements = parse_ok("1 + 2 * 3;");
    let StmtKind::Expression(expr) = &statements[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { op, left, right } = &expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(left.kind, ExprKind::Literal(Literal::Integer(1)));
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Multiply,
            ..
        }
    ));
}

#[test]
fn logical_operators_sit_below_comparison() {
    let statements = parse_ok("a < b && c == d || !e;");
    let StmtKind::Expression(expr) = &statements[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Logical { op, left, right } = &expr.kind else {
        panic!("expected logical expression");
    };
    assert_eq!(*op, LogicalOp::Or);
    assert!(matches!(
        right.kind,
        ExprKind::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
    let ExprKind::Logical { op, left, .. } = &left.kind else {
        panic!("expected nested logical expression");
    };
    assert_eq!(*op, LogicalOp::And);
    assert!(matches!(
        left.kind,
        ExprKind::Relational {
            op: RelationalOp::Less,
            ..
        }
    ));
}

#[test]
fn assignment_is_right_associative() {
    let statements = parse_ok("a = b = 3;");
    let StmtKind::Expression(expr) = &statements[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign { target, value } = &expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(&*target.name, "a");
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn typed_declarations_keep_their_type_name() {
    let statements = parse_ok("int x = 1; bool flag; var y;");
    let types: Vec<Option<String>> = statements
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Declaration(decl) => decl.type_name.as_ref().map(|t| t.lexeme.to_string()),
            other => panic!("expected declaration, got {:?}", other),
        })
        .collect();
    assert_eq!(
        types,
        vec![Some("int".to_string()), Some("bool".to_string()), None]
    );
}

#[test]
fn several_declarators_form_a_sequence() {
    let statements = parse_ok("var a = 1, b, c = a;");
    let StmtKind::Sequence(declarations) = &statements[0].kind else {
        panic!("expected sequence");
    };
    assert_eq!(declarations.len(), 3);
    assert!(declarations
        .iter()
        .all(|stmt| matches!(stmt.kind, StmtKind::Declaration(_))));
}

#[test]
fn function_declaration_with_typed_params_and_return() {
    let statements = parse_ok("fun add(int a, b) -> int { return a + b; }");
    let StmtKind::Function(function) = &statements[0].kind else {
        panic!("expected function");
    };
    assert_eq!(&*function.name.name, "add");
    assert_eq!(function.params.len(), 2);
    assert_eq!(
        function.params[0].type_name.as_ref().map(|t| &*t.lexeme),
        Some("int")
    );
    assert!(function.params[1].type_name.is_none());
    assert_eq!(function.return_type.as_ref().map(|t| &*t.lexeme), Some("int"));
    assert_eq!(function.body.len(), 1);
    assert!(matches!(function.body[0].kind, StmtKind::Return(Some(_))));
}

#[test]
fn print_becomes_a_call_of_the_builtin() {
    let statements = parse_ok("print 1, \"two\";");
    let StmtKind::Expression(expr) = &statements[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Call {
        callee, arguments, ..
    } = &expr.kind
    else {
        panic!("expected call");
    };
    assert!(matches!(&callee.kind, ExprKind::Identifier(id) if &*id.name == "print"));
    assert_eq!(arguments.len(), 2);
}

#[test]
fn control_flow_statements() {
    let statements = parse_ok(
        "if (a) b; else { c; }
         while (x < 3) x = x + 1;
         for (var i = 0; i < 3; i = i + 1) print i;
         for (;;) {}",
    );
    assert!(matches!(
        statements[0].kind,
        StmtKind::If {
            else_branch: Some(_),
            ..
        }
    ));
    assert!(matches!(statements[1].kind, StmtKind::While { .. }));
    let StmtKind::For {
        initializer,
        condition,
        increment,
        ..
    } = &statements[2].kind
    else {
        panic!("expected for loop");
    };
    assert_eq!(initializer.len(), 1);
    assert!(condition.is_some() && increment.is_some());
    let StmtKind::For {
        initializer,
        condition,
        increment,
        ..
    } = &statements[3].kind
    else {
        panic!("expected for loop");
    };
    assert!(initializer.is_empty() && condition.is_none() && increment.is_none());
}

#[test]
fn invalid_assignment_target_is_reported() {
    let (_, diagnostics) = parse("1 + 2 = 3; var ok = 1;");
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::Syntax);
    assert!(diagnostic.message.ends_with("Invalid assignment target."));
}

#[test]
fn parenthesized_assignment_target_is_rejected() {
    let (_, diagnostics) = parse("var a; (a) = 2;");
    assert_eq!(messages(&diagnostics).len(), 1);
    assert!(messages(&diagnostics)[0].ends_with("Invalid assignment target."));

    let statements = parse_ok("var a; var b; a = (b);");
    let StmtKind::Expression(expr) = &statements[2].kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(expr.kind, ExprKind::Assign { .. }));
}

#[test]
fn typed_declaration_inside_a_block() {
    let statements = parse_ok("{ string name = \"x\"; name; }");
    let StmtKind::Block(block) = &statements[0].kind else {
        panic!("expected block");
    };
    assert!(matches!(&block[0].kind, StmtKind::Declaration(d) if d.type_name.is_some()));
    assert!(matches!(block[1].kind, StmtKind::Expression(_)));
}

#[test]
fn parser_recovers_at_statement_boundaries() {
    let (program, diagnostics) = parse("var = 1;\nvar b = ;\nvar c = 3;");
    assert_eq!(diagnostics.len(), 2);
    let lines: Vec<usize> = diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(program
        .statements()
        .iter()
        .any(|stmt| matches!(&stmt.kind, StmtKind::Declaration(d) if &*d.name.name == "c")));
}

#[test]
fn missing_closing_brace_is_repaired() {
    let (program, diagnostics) = parse("{ var a = 1;");
    assert_eq!(diagnostics.len(), 1);
    assert!(messages(&diagnostics)[0].contains("Expected '}' after block."));
    assert!(matches!(program.statements()[0].kind, StmtKind::Block(_)));
}

#[test]
fn lexical_errors_surface_through_the_parser() {
    let (_, diagnostics) = parse("var a = 1 # 2;");
    assert!(diagnostics.has_category(ErrorCategory::Lexical));
}

#[test]
fn diagnostics_render_with_location() {
    let (_, diagnostics) = parse("var 1;");
    assert_eq!(
        diagnostics.to_string(),
        "[<test>:1:5] SyntaxError: at '1': Expected variable name."
    );
}

#[test]
fn include_splices_the_file_into_the_stream() {
    let included = temp_path("included.lm");
    let main = temp_path("main.lm");
    fs::write(&included, "var shared = 1;").unwrap();
    fs::write(
        &main,
        format!(
            "include \"{}\";\nvar after = shared;",
            included.file_name().unwrap().to_str().unwrap()
        ),
    )
    .unwrap();

    let mut parser = Parser::new(Lexer::from_path(&main).unwrap());
    let program = parser.parse();
    assert!(!parser.had_errors(), "{}", parser.diagnostics());
    let names: Vec<String> = program
        .statements()
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Declaration(decl) => Some(decl.name.name.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["shared", "after"]);

    let _ = fs::remove_file(&included);
    let _ = fs::remove_file(&main);
}

#[test]
fn include_cycle_stops_the_parse() {
    let path = temp_path("cycle.lm");
    fs::write(
        &path,
        format!(
            "include \"{}\";\nvar never = 1;",
            path.file_name().unwrap().to_str().unwrap()
        ),
    )
    .unwrap();

    let mut parser = Parser::new(Lexer::from_path(&path).unwrap());
    let program = parser.parse();
    let diagnostics = parser.into_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::Syntax);
    assert!(diagnostic.message.contains("Include cycle"));
    assert!(program.statements().is_empty());

    let _ = fs::remove_file(&path);
}
