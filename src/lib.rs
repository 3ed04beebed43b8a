//! A small Scheme interpreter with a mark-sweep collected heap.
//!
//! Source text is read into heap-allocated values, evaluated by a
//! tree-walking evaluator against a single global environment, and printed
//! back in the same literal syntax. The collector runs between top-level
//! forms with the global environment as its only root.

pub mod arena;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod heap;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod symbol;
pub mod value;

pub use error::{Error, Result};
pub use interpreter::{HeapStats, Interpreter};
pub use value::Val;
