use mscheme::{Error, Interpreter};

fn eval_expr(src: &str) -> String {
    let mut interp = Interpreter::new();
    match interp.run_all(src) {
        Ok(Some(result)) => result,
        Ok(None) => String::new(),
        Err(e) => e.to_string(),
    }
}

fn eval_err(src: &str) -> Error {
    Interpreter::new()
        .run_all(src)
        .expect_err("expected evaluation to fail")
}

#[test]
fn test_self_evaluating() {
    assert_eq!(eval_expr("42"), "42");
    assert_eq!(eval_expr("-17"), "-17");
    assert_eq!(eval_expr("#t"), "#t");
    assert_eq!(eval_expr("#f"), "#f");
}

#[test]
fn test_quote() {
    assert_eq!(eval_expr("(quote a)"), "a");
    assert_eq!(eval_expr("'a"), "a");
    assert_eq!(eval_expr("'(1 2 3)"), "(1 2 3)");
    assert_eq!(eval_expr("'(1 . 2)"), "(1 . 2)");
    assert_eq!(eval_expr("'()"), "()");
    assert_eq!(eval_expr("''a"), "(quote a)");
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval_expr("(+ 1 2 3)"), "6");
    assert_eq!(eval_expr("(- 10 1 2)"), "7");
    assert_eq!(eval_expr("(*)"), "1");
    assert_eq!(eval_expr("(+)"), "0");
    assert_eq!(eval_expr("(* 2 3 4)"), "24");
    assert_eq!(eval_expr("(/ 100 5 2)"), "10");
    assert_eq!(eval_expr("(max 1 5 3)"), "5");
    assert_eq!(eval_expr("(min 4 -2 7)"), "-2");
    assert_eq!(eval_expr("(abs -5)"), "5");
}

#[test]
fn test_comparison() {
    assert_eq!(eval_expr("(= 2 2)"), "#t");
    assert_eq!(eval_expr("(< 1 2)"), "#t");
    assert_eq!(eval_expr("(<= 2 2 3)"), "#t");
    assert_eq!(eval_expr("(> 1 2)"), "#f");
    assert_eq!(eval_expr("(>= 3 2 2)"), "#t");
}

#[test]
fn test_predicates() {
    assert_eq!(eval_expr("(boolean? #f)"), "#t");
    assert_eq!(eval_expr("(boolean? 0)"), "#f");
    assert_eq!(eval_expr("(number? 7)"), "#t");
    assert_eq!(eval_expr("(number? 'a)"), "#f");
    assert_eq!(eval_expr("(symbol? 'a)"), "#t");
    assert_eq!(eval_expr("(pair? '(1))"), "#t");
    assert_eq!(eval_expr("(pair? '())"), "#f");
    assert_eq!(eval_expr("(null? '())"), "#t");
    assert_eq!(eval_expr("(null? '(1))"), "#f");
    assert_eq!(eval_expr("(list? '(1 2))"), "#t");
    assert_eq!(eval_expr("(list? '())"), "#t");
    assert_eq!(eval_expr("(list? '(1 . 2))"), "#f");
    assert_eq!(eval_expr("(not #f)"), "#t");
    assert_eq!(eval_expr("(not 0)"), "#f");
    assert_eq!(eval_expr("(not '())"), "#f");
}

#[test]
fn test_and_or() {
    assert_eq!(eval_expr("(and)"), "#t");
    assert_eq!(eval_expr("(and 1 2)"), "2");
    assert_eq!(eval_expr("(and 1 #f 3)"), "#f");
    assert_eq!(eval_expr("(or)"), "#f");
    assert_eq!(eval_expr("(or #f 3)"), "3");
    assert_eq!(eval_expr("(or #f #f)"), "#f");
}

#[test]
fn test_short_circuit_skips_evaluation() {
    assert_eq!(eval_expr("(and #f (car 1))"), "#f");
    assert_eq!(eval_expr("(or 1 undefined-name)"), "1");
    assert_eq!(eval_expr("(if #t 1 (car 1))"), "1");
}

#[test]
fn test_lists() {
    assert_eq!(eval_expr("(cons 1 '(2 3))"), "(1 2 3)");
    assert_eq!(eval_expr("(cons 'a 'b)"), "(a . b)");
    assert_eq!(eval_expr("(car '(1 2 3))"), "1");
    assert_eq!(eval_expr("(cdr '(1 2 3))"), "(2 3)");
    assert_eq!(eval_expr("(list 1 (+ 1 1) 3)"), "(1 2 3)");
    assert_eq!(eval_expr("(list)"), "()");
    assert_eq!(eval_expr("(list-tail '(a b c d) 2)"), "(c d)");
    assert_eq!(eval_expr("(list-ref '(a b c d) 2)"), "c");
}

#[test]
fn test_mutation() {
    assert_eq!(eval_expr("(define p (cons 1 2)) (set-car! p 10) p"), "(10 . 2)");
    assert_eq!(eval_expr("(define p (list 1 2)) (set-cdr! p '(3)) p"), "(1 3)");
    assert_eq!(eval_expr("(define x 1) (set! x 2) x"), "2");
}

#[test]
fn test_define_and_call() {
    assert_eq!(eval_expr("(define (f x) (+ x 1)) (f 4)"), "5");
    assert_eq!(eval_expr("(define f (lambda (x y) (* x y))) (f 6 7)"), "42");
    assert_eq!(eval_expr("((lambda (x) x) 'v)"), "v");
    assert_eq!(
        eval_expr("(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 10)"),
        "3628800"
    );
}

#[test]
fn test_no_value_prints_empty_list() {
    assert_eq!(eval_expr("(define x 1)"), "()");
    assert_eq!(eval_expr("(if #f 1)"), "()");
}

#[test]
fn test_capture_is_by_reference() {
    assert_eq!(eval_expr("(define n 1) (define (get) n) (set! n 2) (get)"), "2");
    assert_eq!(
        eval_expr(
            "(define (make-counter)
               (define c 0)
               (lambda () (set! c (+ c 1)) c))
             (define k (make-counter))
             (k) (k) (k)"
        ),
        "3"
    );
}

#[test]
fn test_define_shadows_outer_binding() {
    assert_eq!(
        eval_expr("(define x 1) (define (f) (define x 2) x) (f)"),
        "2"
    );
    assert_eq!(eval_expr("(define x 1) (define (f) (define x 2) x) (f) x"), "1");
}

#[test]
fn test_set_mutates_defining_frame() {
    assert_eq!(eval_expr("(define x 1) (define (f) (set! x 5)) (f) x"), "5");
}

#[test]
fn test_closures_see_later_definitions() {
    assert_eq!(
        eval_expr(
            "(define (even? n) (if (= n 0) #t (odd? (- n 1))))
             (define (odd? n) (if (= n 0) #f (even? (- n 1))))
             (even? 10)"
        ),
        "#t"
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(eval_expr("(car 5)"), "Runtime error: car: expected pair, got integer");
    assert_eq!(eval_expr("x"), "Name error: unbound variable: x");
    assert_eq!(
        eval_expr("(+ 1 #t)"),
        "Runtime error: +: expected integer, got boolean"
    );
    assert_eq!(eval_expr("car"), "Runtime error: cannot print a procedure");
    assert_eq!(eval_expr("()"), "Runtime error: cannot evaluate the empty list");
}

#[test]
fn test_error_kinds() {
    assert!(matches!(eval_err("(define x)"), Error::Syntax(_)));
    assert!(matches!(eval_err("(lambda (1) 1)"), Error::Syntax(_)));
    assert!(matches!(eval_err("(lambda (x . y) 1)"), Error::Syntax(_)));
    assert!(matches!(eval_err("(lambda (x))"), Error::Syntax(_)));
    assert!(matches!(eval_err("(set! 1 2)"), Error::Syntax(_)));
    assert!(matches!(eval_err("(1 2"), Error::Syntax(_)));
    assert!(matches!(eval_err(")"), Error::Syntax(_)));
    assert!(matches!(eval_err("(set! y 1)"), Error::Name(_)));
    assert!(matches!(eval_err("(cdr '())"), Error::Runtime(_)));
    assert!(matches!(eval_err("(5 1)"), Error::Runtime(_)));
    assert!(matches!(eval_err("(car 1 2)"), Error::Runtime(_)));
    assert!(matches!(eval_err("((lambda (x) x))"), Error::Runtime(_)));
}

#[test]
fn test_error_aborts_only_current_form() {
    let mut interp = Interpreter::new();
    interp.run("(define x 10)").unwrap();
    assert!(interp.run("(car x)").is_err());
    assert_eq!(interp.run("x").unwrap(), "10");
    assert_eq!(interp.run("(+ x 1)").unwrap(), "11");
}

#[test]
fn test_cyclic_pair_is_predictable() {
    let mut interp = Interpreter::new();
    interp.run_all("(define p (cons 1 2)) (set-cdr! p p)").unwrap();
    assert_eq!(interp.run("(car (cdr p))").unwrap(), "1");
    assert_eq!(interp.run("(list? p)").unwrap(), "#f");
    assert_eq!(
        interp.run("p"),
        Err(Error::runtime("cannot print cyclic structure"))
    );
}
