//! Interactive read-eval-print loop.

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use crate::interpreter::Interpreter;

pub struct ReplConfig {
    pub prompt: String,
    /// Shown while a submission is still missing closing parentheses
    pub continuation_prompt: String,
    pub banner: bool,
    pub history: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: ">>> ".to_string(),
            continuation_prompt: "... ".to_string(),
            banner: true,
            history: None,
        }
    }
}

/// Count of `(` minus `)` outside comments.
pub fn bracket_balance(text: &str) -> i64 {
    let mut balance = 0;
    for line in text.lines() {
        let code = line.split(';').next().unwrap_or_default();
        for c in code.chars() {
            match c {
                '(' => balance += 1,
                ')' => balance -= 1,
                _ => {}
            }
        }
    }
    balance
}

pub fn run_repl(interp: &mut Interpreter, config: &ReplConfig) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    if let Some(path) = &config.history {
        if let Err(err) = rl.load_history(path) {
            // a missing file on first use is expected
            info!("no history loaded from {}: {err}", path.display());
        }
    }

    info!("starting repl");
    if config.banner {
        println!("mscheme {}", env!("CARGO_PKG_VERSION"));
        println!("  Ctrl-C discards the current input, Ctrl-D exits.\n");
    }

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() {
            &config.prompt
        } else {
            &config.continuation_prompt
        };
        match rl.readline(prompt) {
            Ok(line) => {
                if pending.is_empty() && line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                pending.push_str(&line);
                pending.push('\n');
                if bracket_balance(&pending) > 0 {
                    continue;
                }
                let input = std::mem::take(&mut pending);
                match interp.run(&input) {
                    Ok(printed) => println!("{printed}"),
                    Err(err) => println!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                pending.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Some(path) = &config.history {
        if let Err(err) = rl.save_history(path) {
            warn!("could not save history to {}: {err}", path.display());
        }
    }
    Ok(())
}
