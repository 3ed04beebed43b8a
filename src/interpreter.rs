//! Top-level entry points: read, evaluate, print, collect.
//!
//! A collection runs after every top-level form, whether it succeeded or
//! not, and never during one. Forms are read one at a time from the token
//! stream, so source text that has not been evaluated yet is never on the
//! heap when the collector runs.

use tracing::trace;

use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::heap::GcStats;
use crate::parser::{Lexer, Parser};
use crate::value::Val;

/// Live-set sizes and collection count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub objects: usize,
    pub frames: usize,
    pub collections: u64,
}

#[derive(Default)]
pub struct Interpreter {
    evaluator: Evaluator,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read exactly one expression from `text`, evaluate it in the global
    /// environment and return its printed form. Trailing input is rejected
    /// before anything is evaluated.
    pub fn run(&mut self, text: &str) -> Result<String> {
        let tokens = Lexer::new(text).tokenize()?;
        let mut parser = Parser::new(&tokens);
        let result = self.run_single(&mut parser);
        self.evaluator.collect();
        result
    }

    /// Run every top-level form in `text` in order, collecting after each.
    /// Returns the printed result of the last form, or `None` if there were
    /// no forms. The first failure stops the remaining forms.
    pub fn run_all(&mut self, text: &str) -> Result<Option<String>> {
        let tokens = Lexer::new(text).tokenize()?;
        let mut parser = Parser::new(&tokens);
        let mut last = None;
        while !parser.is_at_end() {
            let result = self.read(&mut parser).and_then(|expr| self.eval_print(expr));
            self.evaluator.collect();
            last = Some(result?);
        }
        Ok(last)
    }

    fn run_single(&mut self, parser: &mut Parser<'_>) -> Result<String> {
        let expr = self.read(parser)?;
        if !parser.is_at_end() {
            return Err(Error::syntax("expected a single expression"));
        }
        self.eval_print(expr)
    }

    fn read(&mut self, parser: &mut Parser<'_>) -> Result<Val> {
        let ev = &mut self.evaluator;
        parser.parse_expr(&mut ev.heap, &mut ev.syms)
    }

    fn eval_print(&mut self, expr: Val) -> Result<String> {
        let ev = &mut self.evaluator;
        trace!(form = %ev.print(expr).unwrap_or_default(), "evaluating");
        let val = ev.eval(expr, ev.global_env)?;
        ev.print(val)
    }

    pub fn collect(&mut self) -> GcStats {
        self.evaluator.collect()
    }

    pub fn heap_stats(&self) -> HeapStats {
        HeapStats {
            objects: self.evaluator.heap.len(),
            frames: self.evaluator.envs.len(),
            collections: self.evaluator.heap.collections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_requires_single_expression() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.run("(+ 1 2)").unwrap(), "3");
        assert_eq!(
            interp.run("1 2"),
            Err(Error::syntax("expected a single expression"))
        );
        assert!(matches!(interp.run(""), Err(Error::Syntax(_))));
    }

    #[test]
    fn rejected_trailing_input_is_not_evaluated() {
        let mut interp = Interpreter::new();
        assert_eq!(
            interp.run("(define x 1) 2"),
            Err(Error::syntax("expected a single expression"))
        );
        assert!(matches!(interp.run("x"), Err(Error::Name(_))));
        assert_eq!(interp.heap_stats().objects, 0);
    }

    #[test]
    fn run_all_returns_last() {
        let mut interp = Interpreter::new();
        assert_eq!(
            interp.run_all("(define (f x) (+ x 1)) (f 4)").unwrap(),
            Some("5".to_string())
        );
        assert_eq!(interp.run_all("  ; nothing\n").unwrap(), None);
    }

    #[test]
    fn failure_keeps_earlier_bindings() {
        let mut interp = Interpreter::new();
        let err = interp.run_all("(define a 1) (car 5) (define b 2)").unwrap_err();
        assert!(matches!(err, Error::Runtime(_)));
        assert_eq!(interp.run("a").unwrap(), "1");
        assert!(matches!(interp.run("b"), Err(Error::Name(_))));
    }

    #[test]
    fn collects_once_per_form() {
        let mut interp = Interpreter::new();
        interp.run_all("1 2 3").unwrap();
        assert_eq!(interp.heap_stats().collections, 3);
        let _ = interp.run("(car 1)");
        assert_eq!(interp.heap_stats().collections, 4);
    }

    #[test]
    fn failed_form_garbage_is_reclaimed() {
        let mut interp = Interpreter::new();
        let _ = interp.run("(+ (list 1 2 (cons 3 4)) 5)");
        assert_eq!(interp.heap_stats().objects, 0);
    }
}
