//! spellc CLI - local smoke-testing driver for the spellc compiler.
//!
//! A thin `clap`-derived front end over the `spellc` library crate.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    check::{run_check, CheckArgs},
    emit::{run_emit, EmitArgs},
};

/// spellc - compiler for the spellc TTRPG scripting language.
#[derive(Parser, Debug)]
#[command(name = "spellc")]
#[command(author = "Spellc Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles spellc scripts to target host-language code", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "SPELLC_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a script and print its inferred return type.
    Check(CheckCommand),

    /// Compile a script and print the emitted target-language code.
    Emit(EmitCommand),
}

#[derive(Parser, Debug)]
struct CheckCommand {
    /// Path to the `.spell` source file.
    file: PathBuf,

    /// Path to a JSON/TOML context file seeding host-provided types.
    #[arg(short, long)]
    context: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct EmitCommand {
    /// Path to the `.spell` source file.
    file: PathBuf,

    /// Path to a JSON/TOML context file seeding host-provided types.
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Prefix the emitted code with a `// returnType: …` comment.
    #[arg(long)]
    with_return_type: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check(args) => run_check(CheckArgs { file: args.file, context: args.context }),
        Commands::Emit(args) => run_emit(EmitArgs {
            file: args.file,
            context: args.context,
            with_return_type: args.with_return_type,
        }),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::parse_from(["spellc", "check", "script.spell"]);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn parses_emit_subcommand_with_context() {
        let cli = Cli::parse_from(["spellc", "emit", "script.spell", "--context", "ctx.json"]);
        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.context, Some(PathBuf::from("ctx.json")));
            }
            other => panic!("expected emit command, got {other:?}"),
        }
    }

    #[test]
    fn parses_global_verbose_flag() {
        let cli = Cli::parse_from(["spellc", "--verbose", "check", "script.spell"]);
        assert!(cli.verbose);
    }
}
