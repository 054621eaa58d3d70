use botlisp::{EnvError, Environment, EvalError, Expr, LispError, ParseError, evaluate, parse_str};

fn eval_to_string(input: &str) -> String {
    let globals = Environment::new_global_populated();
    match evaluate(&globals, input) {
        Ok(value) => value.to_string(),
        Err(e) => panic!("Evaluation failed for input '{}': {}", input, e),
    }
}

#[test]
fn end_to_end_examples() {
    assert_eq!(eval_to_string("(cons 1 2)"), "(1 . 2)");
    assert_eq!(eval_to_string("(list 1 2 3)"), "(1 2 3)");
    assert_eq!(eval_to_string("(car (list 1 2))"), "1");
    assert_eq!(eval_to_string("(- 5 3)"), "2");
    assert_eq!(eval_to_string("((lambda (x) (- x 1)) 5)"), "4");
    assert_eq!(eval_to_string("(cdr (list 1 2))"), "(2)");
    assert_eq!(eval_to_string("(list)"), "nil");
}

#[test]
fn undefined_symbol_is_an_unbound_error() {
    let globals = Environment::new_global_populated();
    let err = evaluate(&globals, "foo").expect_err("foo is not bound");
    assert!(
        matches!(&err, LispError::Eval(EvalError::EnvError(EnvError::Unbound(name))) if name.name() == "foo"),
        "got {:?}",
        err
    );
}

#[test]
fn printed_values_parse_back_to_the_same_text() {
    for input in [
        "7",
        "abc",
        r#""tab\there""#,
        r#""bell \a""#,
        "(1 (2 3) . 4)",
        "'(a 'b)",
        "(\"x\" . \"y\")",
    ] {
        let parsed = parse_str(input).expect("input parses");
        let printed = parsed[0].to_string();
        assert_eq!(printed, input);
        let reparsed = parse_str(&printed).expect("printed form parses");
        assert_eq!(reparsed, parsed);
    }
}

#[test]
fn evaluated_lists_round_trip_through_the_printer() {
    let globals = Environment::new_global_populated();
    let value = evaluate(&globals, "(cons 1 (cons \"two\" (list 'three)))").expect("evaluates");
    assert_eq!(value.to_string(), r#"(1 "two" three)"#);
    let quoted = format!("'{}", value);
    assert_eq!(evaluate(&globals, &quoted), Ok(value));
}

#[test]
fn unknown_string_escapes_survive_evaluation() {
    assert_eq!(eval_to_string(r#""\a""#), r#""\a""#);
    assert_eq!(eval_to_string(r#"(car (list "C:\dir"))"#), r#""C:\dir""#);
    let globals = Environment::new_global_populated();
    assert_eq!(evaluate(&globals, r#""\a""#), Ok(Expr::string("\\a")));
}

#[test]
fn self_evaluating_atoms_are_unchanged() {
    let globals = Environment::new_global_populated();
    let nested = Environment::new_enclosed(globals.clone());
    for atom in [Expr::Integer(3), Expr::string("s"), Expr::True, Expr::Nil] {
        for env in [&globals, &nested] {
            assert_eq!(botlisp::evaluator::evaluate(&atom, env), Ok(atom.clone()));
        }
    }
}

#[test]
fn shadowing_inside_a_call_leaves_the_outer_binding_alone() {
    let globals = Environment::new_global_populated();
    evaluate(&globals, "(setq x 10)").expect("setq works");
    let inner = evaluate(&globals, "((lambda (x) (setq x 99) x) 1)").expect("call works");
    assert_eq!(inner, Expr::Integer(99));
    assert_eq!(evaluate(&globals, "x"), Ok(Expr::Integer(10)));
}

#[test]
fn closure_and_native_arity_and_type_errors() {
    let globals = Environment::new_global_populated();
    evaluate(&globals, "(setq pair-up (lambda (a b) (cons a b)))").expect("setq works");
    for input in ["(pair-up 1)", "(pair-up 1 2 3)"] {
        let err = evaluate(&globals, input).expect_err("arity mismatch");
        assert!(
            matches!(err, LispError::Eval(EvalError::WrongArity { expected: 2, .. })),
            "{}: got {:?}",
            input,
            err
        );
    }
    let err = evaluate(&globals, "(- \"five\" 3)").expect_err("type mismatch");
    assert!(matches!(err, LispError::Eval(EvalError::TypeMismatch { .. })));
}

#[test]
fn list_constructor_builds_proper_lists() {
    let globals = Environment::new_global_populated();
    assert_eq!(evaluate(&globals, "(list)"), Ok(Expr::Nil));
    let list = evaluate(&globals, "(list 'a 'b 'c)").expect("list works");
    assert_eq!(
        evaluate(&globals, "(car (list 'a 'b 'c))"),
        Ok(Expr::symbol("a"))
    );
    assert_eq!(
        evaluate(&globals, "(cdr (cdr (cdr (list 'a 'b 'c))))"),
        Ok(Expr::Nil)
    );
    assert_eq!(list.list_items().map(|items| items.len()), Some(3));
}

#[test]
fn dotted_lists_parse_into_pairs() {
    let pair = parse_str("(a . b)").expect("parses").remove(0);
    let Expr::Cons(cell) = &pair else {
        panic!("expected a cons cell, got {:?}", pair);
    };
    assert_eq!(cell.car, Expr::symbol("a"));
    assert_eq!(cell.cdr, Expr::symbol("b"));

    let list = parse_str("(a b . c)").expect("parses").remove(0);
    let Expr::Cons(first) = &list else {
        panic!("expected a cons cell, got {:?}", list);
    };
    assert_eq!(first.car, Expr::symbol("a"));
    let Expr::Cons(second) = &first.cdr else {
        panic!("expected a cons cell, got {:?}", first.cdr);
    };
    assert_eq!(second.cdr, Expr::symbol("c"));
}

#[test]
fn double_quote_evaluates_to_single_quote() {
    let globals = Environment::new_global_populated();
    let value = evaluate(&globals, "''x").expect("evaluates");
    assert_eq!(value, Expr::quoted(Expr::symbol("x")));
    assert_eq!(value.to_string(), "'x");
}

#[test]
fn program_returns_last_value_and_keeps_bindings() {
    let globals = Environment::new_global_populated();
    let value = evaluate(&globals, "(setq a 1) (setq b (cons a a)) b").expect("evaluates");
    assert_eq!(value.to_string(), "(1 . 1)");
    assert_eq!(evaluate(&globals, "(car b)"), Ok(Expr::Integer(1)));
}

#[test]
fn syntax_error_stops_the_whole_program() {
    let globals = Environment::new_global_populated();
    let err = evaluate(&globals, "(setq y 1) (car").expect_err("unclosed list");
    assert!(matches!(err, LispError::Parse(ParseError::UnexpectedEof(_))));
    assert!(evaluate(&globals, "y").is_err(), "nothing should have run");
}

#[test]
fn error_messages_are_tagged_by_stage() {
    let globals = Environment::new_global_populated();
    let message = |input: &str| evaluate(&globals, input).expect_err("fails").to_string();
    assert_eq!(
        message("99999999999999999999"),
        "TokenizeError: integer literal out of range: '99999999999999999999'"
    );
    assert!(message("\"abc").starts_with("ParseError: unexpected invalid '\"abc'"));
    assert_eq!(message("(cdr nil)"), "EvalError: cdr expects a cons cell, got nil");
    assert_eq!(message(""), "ParseError: no expression to evaluate");
    assert_eq!(message("(car 1)"), "EvalError: car expects a cons cell, got integer 1");
    assert!(message("(a . b c)").starts_with("ParseError: malformed dotted list"));
}
