use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mscheme::repl::{run_repl, ReplConfig};
use mscheme::Interpreter;

#[derive(ClapParser)]
#[command(name = "mscheme")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A small Scheme interpreter", long_about = None)]
struct Args {
    /// Source files to run in order; starts the REPL when none are given
    files: Vec<PathBuf>,

    /// Don't print the REPL banner
    #[arg(long)]
    quiet: bool,

    /// File to load and save line-editing history
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,
}

fn run_file(interp: &mut Interpreter, path: &Path) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {err}", path.display());
            return false;
        }
    };
    info!("running {}", path.display());
    match interp.run_all(&source) {
        Ok(_) => true,
        Err(err) => {
            eprintln!("{}: {err}", path.display());
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG overrides the default level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mscheme=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut interp = Interpreter::new();

    if !args.files.is_empty() {
        let mut ok = true;
        for path in &args.files {
            ok &= run_file(&mut interp, path);
        }
        return if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    let config = ReplConfig {
        banner: !args.quiet,
        history: args.history,
        ..ReplConfig::default()
    };
    match run_repl(&mut interp, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
