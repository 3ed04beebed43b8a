//! Evaluator — a tree-walking interpreter.
//!
//! There are no special forms in the evaluator itself. A pair is always an
//! application: its head is evaluated to a procedure, and the procedure is
//! handed the *unevaluated* argument expressions together with the caller's
//! environment. Builtins decide for themselves what to evaluate, which is
//! how `if`, `define`, `quote` and friends share one dispatch path with `+`
//! and `car`. Closures evaluate every argument eagerly in the caller's
//! environment.
//!
//! `eval` and `apply` are plain mutually recursive calls: every nested call
//! uses host stack, and there is no tail-call elimination.

use tracing::debug;

use crate::builtins::Builtin;
use crate::env::{EnvId, EnvStore};
use crate::error::{Error, Result};
use crate::heap::{GcStats, Heap, HeapObject};
use crate::printer;
use crate::symbol::{SymId, SymbolTable};
use crate::value::Val;

pub struct Evaluator {
    pub heap: Heap,
    pub syms: SymbolTable,
    pub envs: EnvStore,
    pub global_env: EnvId,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        let mut envs = EnvStore::new();
        let global_env = envs.new_top_level();
        let mut eval = Evaluator {
            heap: Heap::new(),
            syms: SymbolTable::new(),
            envs,
            global_env,
        };
        eval.register_builtins();
        eval
    }

    fn register_builtins(&mut self) {
        for builtin in Builtin::ALL {
            let sym = self.syms.intern(builtin.name());
            self.envs
                .define(self.global_env, sym, Val::Builtin(builtin))
                .expect("global environment is never collected");
        }
        debug!("registered {} builtins", Builtin::ALL.len());
    }

    // ── Public eval entry ──

    pub fn eval(&mut self, expr: Val, env: EnvId) -> Result<Val> {
        match expr {
            // ── Self-evaluating ──
            Val::Int(_) | Val::Bool(_) => Ok(expr),

            // ── Symbol → lookup ──
            Val::Symbol(sym) => self.lookup(sym, env),

            Val::Nil => Err(Error::runtime("cannot evaluate the empty list")),

            Val::Builtin(_) => Err(Error::runtime("cannot evaluate a procedure object")),

            // ── Application ──
            Val::Obj(r) => match self.heap.get(r) {
                Some(HeapObject::Pair(..)) => {
                    let items = self.heap.spine(expr);
                    let (head, raw_args) = items
                        .split_first()
                        .ok_or_else(|| Error::runtime("cannot evaluate the empty list"))?;
                    let callable = self.eval(*head, env)?;
                    self.apply(callable, raw_args, env)
                }
                Some(HeapObject::Closure(_)) => {
                    Err(Error::runtime("cannot evaluate a procedure object"))
                }
                None => Err(Error::runtime("reference to a collected object")),
            },
        }
    }

    /// Call `callable` with unevaluated `raw_args`; `env` is the ambient
    /// environment of the call site.
    pub fn apply(&mut self, callable: Val, raw_args: &[Val], env: EnvId) -> Result<Val> {
        if let Some(builtin) = callable.as_builtin() {
            return builtin.call(self, raw_args, env);
        }
        if self.heap.is_closure(callable) {
            return self.apply_closure(callable, raw_args, env);
        }
        Err(Error::runtime(format!(
            "expected a procedure, got {}",
            self.type_name(callable)
        )))
    }

    fn apply_closure(&mut self, func: Val, raw_args: &[Val], env: EnvId) -> Result<Val> {
        let closure = self
            .heap
            .get_closure(func)
            .cloned()
            .ok_or_else(|| Error::runtime("not a closure"))?;

        if raw_args.len() != closure.params.len() {
            return Err(Error::runtime(format!(
                "wrong number of arguments: expected {}, got {}",
                closure.params.len(),
                raw_args.len()
            )));
        }

        let mut arg_vals = Vec::with_capacity(raw_args.len());
        for arg in raw_args {
            arg_vals.push(self.eval(*arg, env)?);
        }

        let call_env = self.envs.new_child(closure.env);
        for (&sym, &val) in closure.params.iter().zip(&arg_vals) {
            self.envs.define(call_env, sym, val)?;
        }

        self.eval_body(&closure.body, call_env)
    }

    /// Evaluate a body in order, keeping the last value.
    pub fn eval_body(&mut self, body: &[Val], env: EnvId) -> Result<Val> {
        let mut result = Val::nil();
        for expr in body {
            result = self.eval(*expr, env)?;
        }
        Ok(result)
    }

    pub fn lookup(&self, sym: SymId, env: EnvId) -> Result<Val> {
        self.envs.lookup(env, sym).ok_or_else(|| {
            Error::name(format!("unbound variable: {}", self.syms.name(sym)))
        })
    }

    /// Build a closure over `params_form`, capturing a fresh frame whose
    /// parent is `env`.
    pub fn make_closure(
        &mut self,
        who: &str,
        params_form: Val,
        body: &[Val],
        env: EnvId,
    ) -> Result<Val> {
        let params = self.parse_params(who, params_form)?;
        let frame = self.envs.new_child(env);
        Ok(self.heap.alloc_closure(params, body.to_vec(), frame))
    }

    fn parse_params(&self, who: &str, form: Val) -> Result<Vec<SymId>> {
        let items = self.heap.list_to_vec(form).ok_or_else(|| {
            Error::syntax(format!("{who}: parameter list must be a proper list"))
        })?;
        items
            .into_iter()
            .map(|item| {
                item.as_symbol()
                    .ok_or_else(|| Error::syntax(format!("{who}: parameter must be a symbol")))
            })
            .collect()
    }

    /// Run the collector with the global environment as the only root.
    pub fn collect(&mut self) -> GcStats {
        self.heap.collect(&mut self.envs, self.global_env)
    }

    pub fn print(&self, val: Val) -> Result<String> {
        printer::print_val(val, &self.heap, &self.syms)
    }

    /// Short name of a value's dynamic type, for error messages.
    pub fn type_name(&self, val: Val) -> &'static str {
        match val {
            Val::Int(_) => "integer",
            Val::Bool(_) => "boolean",
            Val::Nil => "empty list",
            Val::Symbol(_) => "symbol",
            Val::Builtin(_) => "procedure",
            Val::Obj(r) => match self.heap.get(r) {
                Some(HeapObject::Pair(..)) => "pair",
                Some(HeapObject::Closure(_)) => "procedure",
                None => "collected object",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn eval_str(ev: &mut Evaluator, src: &str) -> Result<Val> {
        let exprs = parser::parse(src, &mut ev.heap, &mut ev.syms)?;
        let mut last = Val::nil();
        for expr in exprs {
            last = ev.eval(expr, ev.global_env)?;
        }
        Ok(last)
    }

    #[test]
    fn self_evaluating() {
        let mut ev = Evaluator::new();
        assert_eq!(ev.eval(Val::int(42), ev.global_env), Ok(Val::int(42)));
        assert_eq!(ev.eval(Val::boolean(false), ev.global_env), Ok(Val::boolean(false)));
    }

    #[test]
    fn empty_list_is_runtime_error() {
        let mut ev = Evaluator::new();
        assert!(matches!(ev.eval(Val::nil(), ev.global_env), Err(Error::Runtime(_))));
    }

    #[test]
    fn unbound_symbol_is_name_error() {
        let mut ev = Evaluator::new();
        assert!(matches!(eval_str(&mut ev, "nope"), Err(Error::Name(_))));
    }

    #[test]
    fn non_procedure_head() {
        let mut ev = Evaluator::new();
        let err = eval_str(&mut ev, "(1 2)").unwrap_err();
        assert_eq!(err, Error::runtime("expected a procedure, got integer"));
    }

    #[test]
    fn closure_call_binds_params_in_fresh_frame() {
        let mut ev = Evaluator::new();
        let frames = ev.envs.len();
        let v = eval_str(&mut ev, "((lambda (x y) (+ x y)) 3 4)").unwrap();
        assert_eq!(v, Val::int(7));
        // lambda frame + call frame
        assert_eq!(ev.envs.len(), frames + 2);
    }

    #[test]
    fn closure_arity_mismatch() {
        let mut ev = Evaluator::new();
        let err = eval_str(&mut ev, "((lambda (x) x) 1 2)").unwrap_err();
        assert_eq!(
            err,
            Error::runtime("wrong number of arguments: expected 1, got 2")
        );
    }

    #[test]
    fn arguments_evaluated_in_caller_env() {
        let mut ev = Evaluator::new();
        let v = eval_str(
            &mut ev,
            "(define x 10) (define (f x) x) (define (g y) (f (+ x y))) (g 1)",
        )
        .unwrap();
        assert_eq!(v, Val::int(11));
    }

    #[test]
    fn body_returns_last_value() {
        let mut ev = Evaluator::new();
        let v = eval_str(&mut ev, "((lambda () 1 2 3))").unwrap();
        assert_eq!(v, Val::int(3));
    }

    #[test]
    fn collect_keeps_globals() {
        let mut ev = Evaluator::new();
        eval_str(&mut ev, "(define keep (list 1 2 3)) (list 4 5 6)").unwrap();
        ev.collect();
        // `keep`'s three pairs survive; the parsed source and the second
        // list do not
        assert_eq!(ev.heap.len(), 3);
        let keep = eval_str(&mut ev, "keep").unwrap();
        assert_eq!(ev.print(keep).unwrap(), "(1 2 3)");
    }
}
