//! Builtin procedures and special forms.
//!
//! Every builtin receives the raw argument expressions and the ambient
//! environment. Eager procedures evaluate all of them first; control forms
//! evaluate selectively (or not at all, for `quote`). Arity is checked before
//! any argument is evaluated.

use crate::env::EnvId;
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::value::Val;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    // predicates
    IsBoolean,
    Not,
    IsNumber,
    IsPair,
    IsNull,
    IsList,
    IsSymbol,
    // comparison
    NumEq,
    Lt,
    Le,
    Gt,
    Ge,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Max,
    Min,
    Abs,
    // pairs and lists
    Cons,
    Car,
    Cdr,
    SetCar,
    SetCdr,
    List,
    ListTail,
    ListRef,
    // control
    Quote,
    And,
    Or,
    If,
    Define,
    Set,
    Lambda,
}

impl Builtin {
    pub const ALL: [Builtin; 34] = [
        Builtin::IsBoolean,
        Builtin::Not,
        Builtin::IsNumber,
        Builtin::IsPair,
        Builtin::IsNull,
        Builtin::IsList,
        Builtin::IsSymbol,
        Builtin::NumEq,
        Builtin::Lt,
        Builtin::Le,
        Builtin::Gt,
        Builtin::Ge,
        Builtin::Add,
        Builtin::Sub,
        Builtin::Mul,
        Builtin::Div,
        Builtin::Max,
        Builtin::Min,
        Builtin::Abs,
        Builtin::Cons,
        Builtin::Car,
        Builtin::Cdr,
        Builtin::SetCar,
        Builtin::SetCdr,
        Builtin::List,
        Builtin::ListTail,
        Builtin::ListRef,
        Builtin::Quote,
        Builtin::And,
        Builtin::Or,
        Builtin::If,
        Builtin::Define,
        Builtin::Set,
        Builtin::Lambda,
    ];

    /// The name the builtin is bound to in the global environment.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::IsBoolean => "boolean?",
            Builtin::Not => "not",
            Builtin::IsNumber => "number?",
            Builtin::IsPair => "pair?",
            Builtin::IsNull => "null?",
            Builtin::IsList => "list?",
            Builtin::IsSymbol => "symbol?",
            Builtin::NumEq => "=",
            Builtin::Lt => "<",
            Builtin::Le => "<=",
            Builtin::Gt => ">",
            Builtin::Ge => ">=",
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Mul => "*",
            Builtin::Div => "/",
            Builtin::Max => "max",
            Builtin::Min => "min",
            Builtin::Abs => "abs",
            Builtin::Cons => "cons",
            Builtin::Car => "car",
            Builtin::Cdr => "cdr",
            Builtin::SetCar => "set-car!",
            Builtin::SetCdr => "set-cdr!",
            Builtin::List => "list",
            Builtin::ListTail => "list-tail",
            Builtin::ListRef => "list-ref",
            Builtin::Quote => "quote",
            Builtin::And => "and",
            Builtin::Or => "or",
            Builtin::If => "if",
            Builtin::Define => "define",
            Builtin::Set => "set!",
            Builtin::Lambda => "lambda",
        }
    }

    pub fn call(self, ev: &mut Evaluator, args: &[Val], env: EnvId) -> Result<Val> {
        let name = self.name();
        match self {
            Builtin::IsBoolean => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(v.as_bool().is_some()))
            }
            Builtin::Not => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(v == Val::boolean(false)))
            }
            Builtin::IsNumber => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(v.as_int().is_some()))
            }
            Builtin::IsPair => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(ev.heap.is_pair(v)))
            }
            Builtin::IsNull => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(v.is_nil()))
            }
            Builtin::IsList => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(ev.heap.is_proper_list(v)))
            }
            Builtin::IsSymbol => {
                let v = eval_one(ev, name, args, env)?;
                Ok(Val::boolean(v.as_symbol().is_some()))
            }

            Builtin::NumEq => numeric_cmp(ev, name, args, env, |a, b| a == b),
            Builtin::Lt => numeric_cmp(ev, name, args, env, |a, b| a < b),
            Builtin::Le => numeric_cmp(ev, name, args, env, |a, b| a <= b),
            Builtin::Gt => numeric_cmp(ev, name, args, env, |a, b| a > b),
            Builtin::Ge => numeric_cmp(ev, name, args, env, |a, b| a >= b),

            Builtin::Add => {
                let nums = eval_ints(ev, name, args, env)?;
                nums.into_iter()
                    .try_fold(0i64, |acc, n| acc.checked_add(n))
                    .map(Val::int)
                    .ok_or_else(overflow)
            }
            Builtin::Mul => {
                let nums = eval_ints(ev, name, args, env)?;
                nums.into_iter()
                    .try_fold(1i64, |acc, n| acc.checked_mul(n))
                    .map(Val::int)
                    .ok_or_else(overflow)
            }
            Builtin::Sub => numeric_fold(ev, name, args, env, |a, b| {
                a.checked_sub(b).ok_or_else(overflow)
            }),
            Builtin::Div => numeric_fold(ev, name, args, env, |a, b| {
                if b == 0 {
                    return Err(Error::runtime("division by zero"));
                }
                a.checked_div(b).ok_or_else(overflow)
            }),
            Builtin::Max => numeric_fold(ev, name, args, env, |a, b| Ok(a.max(b))),
            Builtin::Min => numeric_fold(ev, name, args, env, |a, b| Ok(a.min(b))),
            Builtin::Abs => {
                let v = eval_one(ev, name, args, env)?;
                let n = expect_int(ev, name, v)?;
                n.checked_abs().map(Val::int).ok_or_else(overflow)
            }

            Builtin::Cons => {
                let [car, cdr] = eval_two(ev, name, args, env)?;
                Ok(ev.heap.cons(car, cdr))
            }
            Builtin::Car => {
                let v = eval_one(ev, name, args, env)?;
                ev.heap.car(v).ok_or_else(|| not_a_pair(ev, name, v))
            }
            Builtin::Cdr => {
                let v = eval_one(ev, name, args, env)?;
                ev.heap.cdr(v).ok_or_else(|| not_a_pair(ev, name, v))
            }
            Builtin::SetCar => {
                let [pair, val] = eval_two(ev, name, args, env)?;
                if !ev.heap.set_car(pair, val) {
                    return Err(not_a_pair(ev, name, pair));
                }
                Ok(Val::nil())
            }
            Builtin::SetCdr => {
                let [pair, val] = eval_two(ev, name, args, env)?;
                if !ev.heap.set_cdr(pair, val) {
                    return Err(not_a_pair(ev, name, pair));
                }
                Ok(Val::nil())
            }
            Builtin::List => {
                let vals = eval_all(ev, args, env)?;
                Ok(ev.heap.list(&vals))
            }
            Builtin::ListTail => {
                let [list, k] = eval_two(ev, name, args, env)?;
                let k = expect_index(ev, name, k)?;
                list_tail(ev, name, list, k)
            }
            Builtin::ListRef => {
                let [list, k] = eval_two(ev, name, args, env)?;
                let k = expect_index(ev, name, k)?;
                let tail = list_tail(ev, name, list, k)?;
                ev.heap
                    .car(tail)
                    .ok_or_else(|| Error::runtime(format!("{name}: index {k} out of range")))
            }

            Builtin::Quote => {
                require_args(name, args, 1)?;
                Ok(args[0])
            }
            Builtin::And => {
                let mut last = Val::boolean(true);
                for arg in args {
                    last = ev.eval(*arg, env)?;
                    if !last.is_truthy() {
                        return Ok(last);
                    }
                }
                Ok(last)
            }
            Builtin::Or => {
                let mut last = Val::boolean(false);
                for arg in args {
                    last = ev.eval(*arg, env)?;
                    if last.is_truthy() {
                        return Ok(last);
                    }
                }
                Ok(last)
            }
            Builtin::If => eval_if(ev, args, env),
            Builtin::Define => eval_define(ev, args, env),
            Builtin::Set => eval_set(ev, args, env),
            Builtin::Lambda => {
                if args.len() < 2 {
                    return Err(Error::syntax("lambda: expected parameters and a body"));
                }
                ev.make_closure(name, args[0], &args[1..], env)
            }
        }
    }
}

// ── Argument helpers ──

fn require_args(name: &str, args: &[Val], n: usize) -> Result<()> {
    if args.len() != n {
        return Err(Error::runtime(format!(
            "{name}: expected {n} argument{}, got {}",
            if n == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

fn require_at_least(name: &str, args: &[Val], n: usize) -> Result<()> {
    if args.len() < n {
        return Err(Error::runtime(format!(
            "{name}: expected at least {n} argument{}, got {}",
            if n == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

fn eval_all(ev: &mut Evaluator, args: &[Val], env: EnvId) -> Result<Vec<Val>> {
    args.iter().map(|arg| ev.eval(*arg, env)).collect()
}

fn eval_one(ev: &mut Evaluator, name: &str, args: &[Val], env: EnvId) -> Result<Val> {
    require_args(name, args, 1)?;
    ev.eval(args[0], env)
}

fn eval_two(ev: &mut Evaluator, name: &str, args: &[Val], env: EnvId) -> Result<[Val; 2]> {
    require_args(name, args, 2)?;
    let first = ev.eval(args[0], env)?;
    let second = ev.eval(args[1], env)?;
    Ok([first, second])
}

fn expect_int(ev: &Evaluator, name: &str, v: Val) -> Result<i64> {
    v.as_int().ok_or_else(|| {
        Error::runtime(format!(
            "{name}: expected integer, got {}",
            ev.type_name(v)
        ))
    })
}

fn expect_index(ev: &Evaluator, name: &str, v: Val) -> Result<usize> {
    let k = expect_int(ev, name, v)?;
    usize::try_from(k)
        .map_err(|_| Error::runtime(format!("{name}: index must be non-negative, got {k}")))
}

/// Evaluate every argument, then require them all to be integers.
fn eval_ints(ev: &mut Evaluator, name: &str, args: &[Val], env: EnvId) -> Result<Vec<i64>> {
    let vals = eval_all(ev, args, env)?;
    vals.into_iter().map(|v| expect_int(ev, name, v)).collect()
}

fn not_a_pair(ev: &Evaluator, name: &str, v: Val) -> Error {
    Error::runtime(format!("{name}: expected pair, got {}", ev.type_name(v)))
}

fn overflow() -> Error {
    Error::runtime("integer overflow")
}

// ── Arithmetic helpers ──

/// Left fold with the first argument as the accumulator; needs at least one.
fn numeric_fold(
    ev: &mut Evaluator,
    name: &str,
    args: &[Val],
    env: EnvId,
    op: fn(i64, i64) -> Result<i64>,
) -> Result<Val> {
    require_at_least(name, args, 1)?;
    let nums = eval_ints(ev, name, args, env)?;
    let mut acc = nums[0];
    for &n in &nums[1..] {
        acc = op(acc, n)?;
    }
    Ok(Val::int(acc))
}

fn numeric_cmp(
    ev: &mut Evaluator,
    name: &str,
    args: &[Val],
    env: EnvId,
    cmp: fn(i64, i64) -> bool,
) -> Result<Val> {
    let nums = eval_ints(ev, name, args, env)?;
    Ok(Val::boolean(nums.windows(2).all(|w| cmp(w[0], w[1]))))
}

// ── Lists ──

/// The `k`th cdr of `list`, which must be a list with at least `k` pairs.
fn list_tail(ev: &Evaluator, name: &str, list: Val, k: usize) -> Result<Val> {
    if !list.is_nil() && !ev.heap.is_pair(list) {
        return Err(Error::runtime(format!(
            "{name}: expected list, got {}",
            ev.type_name(list)
        )));
    }
    let mut current = list;
    for _ in 0..k {
        current = ev
            .heap
            .cdr(current)
            .ok_or_else(|| Error::runtime(format!("{name}: index {k} out of range")))?;
    }
    Ok(current)
}

// ── Control forms ──

fn eval_if(ev: &mut Evaluator, args: &[Val], env: EnvId) -> Result<Val> {
    if !(2..=3).contains(&args.len()) {
        return Err(Error::syntax("if: expected (if test then [else])"));
    }
    let test = ev.eval(args[0], env)?;
    if test.is_truthy() {
        ev.eval(args[1], env)
    } else if let Some(alternative) = args.get(2) {
        ev.eval(*alternative, env)
    } else {
        Ok(Val::nil())
    }
}

fn eval_define(ev: &mut Evaluator, args: &[Val], env: EnvId) -> Result<Val> {
    let Some(&target) = args.first() else {
        return Err(Error::syntax("define: expected a name"));
    };

    // (define x expr)
    if let Some(sym) = target.as_symbol() {
        if args.len() != 2 {
            return Err(Error::syntax("define: expected (define name value)"));
        }
        let val = ev.eval(args[1], env)?;
        ev.envs.define(env, sym, val)?;
        return Ok(Val::nil());
    }

    // (define (f params...) body...)  → (define f (lambda (params...) body...))
    if ev.heap.is_pair(target) {
        if args.len() < 2 {
            return Err(Error::syntax("define: expected a body"));
        }
        let name = ev
            .heap
            .car(target)
            .and_then(Val::as_symbol)
            .ok_or_else(|| Error::syntax("define: function name must be a symbol"))?;
        let params = ev.heap.cdr(target).unwrap_or(Val::nil());
        let closure = ev.make_closure("define", params, &args[1..], env)?;
        ev.envs.define(env, name, closure)?;
        return Ok(Val::nil());
    }

    Err(Error::syntax("define: invalid target"))
}

fn eval_set(ev: &mut Evaluator, args: &[Val], env: EnvId) -> Result<Val> {
    if args.len() != 2 {
        return Err(Error::syntax("set!: expected (set! name value)"));
    }
    let sym = args[0]
        .as_symbol()
        .ok_or_else(|| Error::syntax("set!: name must be a symbol"))?;
    let frame = ev.envs.find_defining_frame(env, sym).ok_or_else(|| {
        Error::name(format!("set!: unbound variable: {}", ev.syms.name(sym)))
    })?;
    let val = ev.eval(args[1], env)?;
    ev.envs.define(frame, sym, val)?;
    Ok(Val::nil())
}
